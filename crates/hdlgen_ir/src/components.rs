//! Composite building blocks assembled from processes and nets.
//!
//! These are conveniences on [`Entity`]: each one adds ordinary nets and
//! processes, so the writers need no special support for them.

use crate::entity::{check_assignable, Entity};
use crate::expr::{Expr, Operand};
use crate::ids::ItemId;
use crate::namespace::Scope;
use crate::net::NetDecl;
use crate::types::{bitlen, DataType};
use hdlgen_common::{Polarity, RtlError, RtlResult};

/// Parameters for [`Entity::add_dff`].
///
/// Clock and reset fall back to the entity's defaults. Without a data input
/// a fresh net of the flip-flop's type is created; without an explicit type
/// the flip-flop takes the data input's type, or `Bit`.
#[derive(Debug, Clone, Default)]
pub struct DffDecl {
    name: Option<String>,
    data_type: Option<DataType>,
    data_in: Option<Expr>,
    clock: Option<(Expr, Polarity)>,
    reset: Option<(Expr, Polarity)>,
    reset_value: Option<Operand>,
    enable: Option<Expr>,
    enable_polarity: Option<Polarity>,
}

impl DffDecl {
    /// A flip-flop with every parameter defaulted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the flip-flop's process.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the stored type.
    pub fn data_type(mut self, ty: DataType) -> Self {
        self.data_type = Some(ty);
        self
    }

    /// Sets the data input.
    pub fn data_in(mut self, data_in: Expr) -> Self {
        self.data_in = Some(data_in);
        self
    }

    /// Sets the clock and its active edge.
    pub fn clock(mut self, clock: Expr, edge: Polarity) -> Self {
        self.clock = Some((clock, edge));
        self
    }

    /// Sets the asynchronous reset and its active level.
    pub fn reset(mut self, reset: Expr, polarity: Polarity) -> Self {
        self.reset = Some((reset, polarity));
        self
    }

    /// Sets the value loaded on reset (0 by default).
    pub fn reset_value(mut self, value: impl Into<Operand>) -> Self {
        self.reset_value = Some(value.into());
        self
    }

    /// Sets the synchronous enable and its active level.
    pub fn enable(mut self, enable: Expr, polarity: Polarity) -> Self {
        self.enable = Some(enable);
        self.enable_polarity = Some(polarity);
        self
    }

    /// Requests an enable without supplying one; a fresh `Bit` net is created.
    pub fn enable_polarity(mut self, polarity: Polarity) -> Self {
        self.enable_polarity = Some(polarity);
        self
    }
}

/// Handles to the pieces of a flip-flop built by [`Entity::add_dff`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dff {
    /// The clocked process.
    pub process: ItemId,
    /// The register output.
    pub q: Expr,
    /// The data input.
    pub data_in: Expr,
    /// The reset, if any.
    pub reset: Option<Expr>,
    /// The enable, if any.
    pub enable: Option<Expr>,
}

/// Outputs of [`Entity::add_linear_fsm`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFsm {
    /// High while in one of the running states.
    pub running: Expr,
    /// Index of the current running state.
    pub count: Expr,
    /// The clocked process.
    pub process: ItemId,
}

impl Entity {
    /// Adds a D flip-flop.
    pub fn add_dff(&mut self, decl: DffDecl) -> RtlResult<Dff> {
        let DffDecl {
            name,
            data_type,
            data_in,
            clock,
            reset,
            reset_value,
            enable,
            enable_polarity,
        } = decl;
        self.check_name(Scope::Entity, name.as_deref())?;
        let clock = clock
            .or_else(|| self.default_clock().cloned())
            .ok_or_else(|| RtlError::config("flip-flop needs a clock and no default clock is set"))?;
        let reset = reset.or_else(|| self.default_reset().cloned());
        let ty = match (data_type, &data_in) {
            (Some(ty), Some(d)) => {
                check_assignable(&ty, d)?;
                ty
            }
            (Some(ty), None) => ty,
            (None, Some(d)) => d.data_type(),
            (None, None) => DataType::Bit,
        };

        let data_in = match data_in {
            Some(d) => d,
            None => self.add_net(NetDecl::new().data_type(ty.clone()))?,
        };
        let enable = match (enable, enable_polarity) {
            (Some(e), polarity) => Some((e, polarity.unwrap_or_default())),
            (None, Some(polarity)) => Some((self.add_net(NetDecl::new())?, polarity)),
            (None, None) => None,
        };
        let q = self.add_net(NetDecl::new().data_type(ty).reg())?;
        let process = self.add_clocked_process(name.as_deref(), Some(clock), reset.clone())?;

        let p = self.process_mut(process)?;
        if let Some((e, polarity)) = &enable {
            p.set_enable(e.clone(), *polarity)?;
        }
        if reset.is_some() {
            let value = reset_value.unwrap_or(Operand::Int(0));
            p.async_body_mut()?.add_assign(q.clone(), value, false);
        }
        p.body_mut().add_assign(q.clone(), data_in.clone(), false);

        Ok(Dff {
            process,
            q,
            data_in,
            reset: reset.map(|(e, _)| e),
            enable: enable.map(|(e, _)| e),
        })
    }

    /// Adds a chain of `stages` flip-flops, each reset to 0.
    ///
    /// Returns a net named `name` carrying the delayed value.
    pub fn add_delay(
        &mut self,
        data_in: Expr,
        stages: u32,
        name: Option<&str>,
        clock: Option<(Expr, Polarity)>,
        reset: Option<(Expr, Polarity)>,
    ) -> RtlResult<Expr> {
        self.check_name(Scope::Entity, name)?;
        let clock = match (stages, clock) {
            (0, clock) => clock,
            (_, Some(clock)) => Some(clock),
            (_, None) => Some(self.default_clock().cloned().ok_or_else(|| {
                RtlError::config("delay line needs a clock and no default clock is set")
            })?),
        };

        let mut decl = NetDecl::new().data_type(data_in.data_type());
        decl.name = name.map(str::to_string);
        let out = self.add_net(decl)?;
        let mut tap = data_in;
        for _ in 0..stages {
            let stage = DffDecl {
                data_in: Some(tap),
                clock: clock.clone(),
                reset: reset.clone(),
                reset_value: Some(Operand::Int(0)),
                ..DffDecl::default()
            };
            tap = self.add_dff(stage)?.q;
        }
        self.connect(&out, tap)?;
        Ok(out)
    }

    /// Adds a 2:1 multiplexer: the output follows `in1` when `sel` is set and
    /// `in0` otherwise.
    ///
    /// Integer inputs take the other input's type; when both are integers the
    /// type must be given.
    pub fn add_mux2(
        &mut self,
        sel: Expr,
        in0: impl Into<Operand>,
        in1: impl Into<Operand>,
        data_type: Option<DataType>,
        name: Option<&str>,
    ) -> RtlResult<Expr> {
        let in0: Operand = in0.into();
        let in1: Operand = in1.into();
        let ty = match (data_type, &in0, &in1) {
            (Some(ty), _, _) => ty,
            (None, Operand::Expr(e), _) | (None, _, Operand::Expr(e)) => e.data_type(),
            (None, Operand::Int(_), Operand::Int(_)) => {
                return Err(RtlError::config(
                    "multiplexer with two integer inputs needs a data type",
                ))
            }
        };
        let in0 = in0.into_expr(&ty);
        let in1 = in1.into_expr(&ty);
        check_assignable(&ty, &in0)?;
        check_assignable(&ty, &in1)?;

        let mut decl = NetDecl::new().data_type(ty).reg();
        decl.name = name.map(str::to_string);
        let out = self.add_net(decl)?;
        let process = self.add_comb_process(None)?;
        let branch = self.process_mut(process)?.body_mut().add_if(sel);
        branch.then_body_mut().add_assign(out.clone(), in1, false);
        branch.else_body_mut().add_assign(out.clone(), in0, false);
        Ok(out)
    }

    /// Adds a state machine with `states` running states and one idle state.
    ///
    /// `start` moves it from idle to the first running state; after the last
    /// running state it returns to idle. Clock and reset fall back to the
    /// entity's defaults.
    pub fn add_linear_fsm(
        &mut self,
        states: u32,
        clock: Option<(Expr, Polarity)>,
        reset: Option<(Expr, Polarity)>,
        start: Expr,
    ) -> RtlResult<LinearFsm> {
        if states == 0 {
            return Err(RtlError::config("linear state machine needs at least one state"));
        }
        self.ensure_mutable()?;
        let clock = clock
            .or_else(|| self.default_clock().cloned())
            .ok_or_else(|| RtlError::config("state machine needs a clock and no default clock is set"))?;
        let reset = reset.or_else(|| self.default_reset().cloned());
        let count_type = DataType::BitVector(bitlen(u64::from(states - 1)).max(1));

        let running = self.add_net(NetDecl::new().reg())?;
        let count = self.add_net(NetDecl::new().data_type(count_type).reg())?;
        let process = self.add_clocked_process(None, Some(clock), reset.clone())?;

        let p = self.process_mut(process)?;
        if reset.is_some() {
            let on_reset = p.async_body_mut()?;
            on_reset.add_assign(running.clone(), 0, false);
            on_reset.add_assign(count.clone(), 0, false);
        }
        let if_running = p.body_mut().add_if(running.clone());
        let advance = if_running.then_body_mut();
        advance.add_assign(count.clone(), &count + 1, false);
        advance
            .add_if(count.equal(states - 1))
            .then_body_mut()
            .add_assign(running.clone(), 0, false);
        let idle = if_running.else_body_mut().add_if(start).then_body_mut();
        idle.add_assign(running.clone(), 1, false);
        idle.add_assign(count.clone(), 0, false);

        Ok(LinearFsm {
            running,
            count,
            process,
        })
    }
}
