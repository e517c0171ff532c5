//! Entity ports.

use crate::types::DataType;
use serde::{Deserialize, Serialize};

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port.
    Input,
    /// Output port.
    Output,
    /// Bidirectional port.
    InOut,
}

/// A port on an entity's interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub(crate) name: Option<String>,
    /// Port direction.
    pub direction: PortDirection,
    /// Declared type.
    pub data_type: DataType,
}

impl Port {
    /// Returns the port name, `None` until anonymous names are resolved.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_distinct() {
        assert_ne!(PortDirection::Input, PortDirection::Output);
        assert_ne!(PortDirection::Output, PortDirection::InOut);
    }

    #[test]
    fn anonymous_port_has_no_name() {
        let p = Port {
            name: None,
            direction: PortDirection::Input,
            data_type: DataType::Bit,
        };
        assert_eq!(p.name(), None);
    }
}
