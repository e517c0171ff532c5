//! Processes: combinational and clocked behavioural blocks.

use crate::expr::Expr;
use crate::stmt::StatementBlock;
use hdlgen_common::{Polarity, RtlError, RtlResult};
use serde::{Deserialize, Serialize};

/// Clocking of a clocked process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockedControl {
    /// Clock signal.
    pub clock: Expr,
    /// Active clock edge.
    pub edge: Polarity,
    /// Asynchronous control (usually a reset) and its active level.
    pub async_ctl: Option<(Expr, Polarity)>,
    /// Synchronous enable and its active level.
    pub enable: Option<(Expr, Polarity)>,
}

/// Whether a process is combinational or clocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProcessKind {
    /// Re-evaluated whenever an input changes.
    Combinational,
    /// Evaluated on a clock edge or an asynchronous control event.
    Clocked(ClockedControl),
}

/// A process item.
///
/// A clocked process has two sections: the asynchronous section runs while
/// the async control is active and dominates the synchronous section, which
/// runs on the clock edge (gated by the enable, if any).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    kind: ProcessKind,
    body: StatementBlock,
    async_body: StatementBlock,
}

impl Process {
    /// Creates an empty combinational process.
    pub fn combinational() -> Self {
        Self {
            kind: ProcessKind::Combinational,
            body: StatementBlock::new(),
            async_body: StatementBlock::new(),
        }
    }

    /// Creates an empty clocked process.
    pub fn clocked(clock: Expr, edge: Polarity, async_ctl: Option<(Expr, Polarity)>) -> Self {
        Self {
            kind: ProcessKind::Clocked(ClockedControl {
                clock,
                edge,
                async_ctl,
                enable: None,
            }),
            body: StatementBlock::new(),
            async_body: StatementBlock::new(),
        }
    }

    /// The process kind.
    pub fn kind(&self) -> &ProcessKind {
        &self.kind
    }

    /// Returns the clocking when the process is clocked.
    pub fn clocking(&self) -> Option<&ClockedControl> {
        match &self.kind {
            ProcessKind::Clocked(c) => Some(c),
            ProcessKind::Combinational => None,
        }
    }

    /// Returns `true` for clocked processes.
    pub fn is_clocked(&self) -> bool {
        self.clocking().is_some()
    }

    /// The body, or for clocked processes the synchronous section.
    pub fn body(&self) -> &StatementBlock {
        &self.body
    }

    /// Mutable access to [`Process::body`].
    pub fn body_mut(&mut self) -> &mut StatementBlock {
        &mut self.body
    }

    /// The asynchronous section (empty unless an async control is set).
    pub fn async_body(&self) -> &StatementBlock {
        &self.async_body
    }

    /// Mutable access to the asynchronous section.
    ///
    /// Fails unless the process is clocked with an async control.
    pub fn async_body_mut(&mut self) -> RtlResult<&mut StatementBlock> {
        match &self.kind {
            ProcessKind::Clocked(ClockedControl {
                async_ctl: Some(_), ..
            }) => Ok(&mut self.async_body),
            _ => Err(RtlError::config(
                "process has no asynchronous control signal",
            )),
        }
    }

    /// Gates the synchronous section with `enable`.
    pub fn set_enable(&mut self, enable: Expr, polarity: Polarity) -> RtlResult<()> {
        match &mut self.kind {
            ProcessKind::Clocked(c) => {
                c.enable = Some((enable, polarity));
                Ok(())
            }
            ProcessKind::Combinational => Err(RtlError::config(
                "only clocked processes take an enable",
            )),
        }
    }

    /// Calls `f` for every expression the process reads or writes.
    pub fn for_each_expr(&self, f: &mut dyn FnMut(&Expr)) {
        if let ProcessKind::Clocked(c) = &self.kind {
            f(&c.clock);
            if let Some((e, _)) = &c.async_ctl {
                f(e);
            }
            if let Some((e, _)) = &c.enable {
                f(e);
            }
        }
        self.async_body.for_each_expr(f);
        self.body.for_each_expr(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PortId;
    use crate::types::DataType;

    fn port(id: u32) -> Expr {
        Expr::port(PortId::from_raw(id), DataType::Bit)
    }

    #[test]
    fn combinational_has_no_async_section() {
        let mut p = Process::combinational();
        assert!(!p.is_clocked());
        assert!(matches!(
            p.async_body_mut(),
            Err(RtlError::InvalidConfiguration(_))
        ));
        assert!(p.set_enable(port(0), Polarity::Positive).is_err());
    }

    #[test]
    fn clocked_without_async_rejects_async_section() {
        let mut p = Process::clocked(port(0), Polarity::Positive, None);
        assert!(p.is_clocked());
        assert!(p.async_body_mut().is_err());
    }

    #[test]
    fn clocked_with_async_section() {
        let mut p = Process::clocked(port(0), Polarity::Negative, Some((port(1), Polarity::Negative)));
        p.async_body_mut().unwrap().add_assign(port(2), 0, false);
        p.body_mut().add_assign(port(2), port(3), false);
        assert_eq!(p.async_body().len(), 1);
        assert_eq!(p.body().len(), 1);
        assert_eq!(p.clocking().map(|c| c.edge), Some(Polarity::Negative));
    }

    #[test]
    fn enable_is_recorded() {
        let mut p = Process::clocked(port(0), Polarity::Positive, None);
        p.set_enable(port(4), Polarity::Negative).unwrap();
        let c = p.clocking().unwrap();
        assert_eq!(c.enable, Some((port(4), Polarity::Negative)));
        let mut n = 0;
        p.for_each_expr(&mut |_| n += 1);
        assert_eq!(n, 2);
    }
}
