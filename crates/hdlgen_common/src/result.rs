//! Common result and error types for model construction and rendering.

/// The standard result type for fallible construction and rendering calls.
pub type RtlResult<T> = Result<T, RtlError>;

/// Errors raised while building or rendering a hardware model.
///
/// Every variant is fatal for the call that produced it. Construction calls
/// check their preconditions before mutating anything, so a model is left
/// exactly as it was when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RtlError {
    /// A name is already taken in the scope it was added to.
    #[error("name '{name}' is already in use in '{scope}'")]
    NameCollision {
        /// The entity or named block owning the namespace.
        scope: String,
        /// The rejected name.
        name: String,
    },

    /// Two data types that must agree do not.
    #[error("data type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The type required by the context.
        expected: String,
        /// The type actually supplied.
        found: String,
    },

    /// A port name was looked up on an entity that has no such port.
    #[error("entity '{entity}' has no port named '{port}'")]
    UnknownPort {
        /// Name of the instantiated entity.
        entity: String,
        /// The requested port name.
        port: String,
    },

    /// A construction parameter or renderer input is not acceptable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An expression tree violates a structural rule.
    #[error("structural violation: {0}")]
    StructuralViolation(String),
}

impl RtlError {
    /// Creates an [`RtlError::InvalidConfiguration`] from any message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Creates an [`RtlError::StructuralViolation`] from any message.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::StructuralViolation(message.into())
    }

    /// Creates an [`RtlError::TypeMismatch`] from anything displayable.
    pub fn mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_collision() {
        let err = RtlError::NameCollision {
            scope: "counter".to_string(),
            name: "clk".to_string(),
        };
        assert_eq!(format!("{err}"), "name 'clk' is already in use in 'counter'");
    }

    #[test]
    fn display_type_mismatch() {
        let err = RtlError::mismatch("BitVector(8)", "Bit");
        assert_eq!(
            format!("{err}"),
            "data type mismatch: expected BitVector(8), found Bit"
        );
    }

    #[test]
    fn display_unknown_port() {
        let err = RtlError::UnknownPort {
            entity: "fifo".to_string(),
            port: "wr_en".to_string(),
        };
        assert_eq!(format!("{err}"), "entity 'fifo' has no port named 'wr_en'");
    }

    #[test]
    fn display_invalid_configuration() {
        let err = RtlError::config("async control requires a clock");
        assert_eq!(
            format!("{err}"),
            "invalid configuration: async control requires a clock"
        );
    }

    #[test]
    fn display_structural_violation() {
        let err = RtlError::structural("concat operand is not a vector");
        assert_eq!(
            format!("{err}"),
            "structural violation: concat operand is not a vector"
        );
    }

    #[test]
    fn err_path() {
        let r: RtlResult<i32> = Err(RtlError::config("bad"));
        assert!(matches!(r, Err(RtlError::InvalidConfiguration(_))));
    }
}
