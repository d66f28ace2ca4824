//! Per-step phase sequencing for `BoundaryValues`.
//!
//! ```text
//! Idle ──request_comms──▶ Issued ──end_iteration──▶ Sent ──finish_receive──▶ Received
//!  ▲                                                                            │
//!  └──────────────────────────── reset (from any phase) ◀──────────────────────┘
//! ```
//! `request_comms` is also accepted from `Received`, so a driver that does not
//! reset every step can go straight into the next step.

use std::fmt;

use crate::iolet_error::IoletError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum IterationPhase {
    #[default]
    Idle,
    Issued,
    Sent,
    Received,
}

/// The four driver-facing phase operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PhaseOp {
    RequestComms,
    EndIteration,
    FinishReceive,
    Reset,
}

impl IterationPhase {
    /// Phase after `op`, or `PhaseOrder` if `op` is not allowed now.
    pub fn next(self, op: PhaseOp) -> Result<IterationPhase, IoletError> {
        use IterationPhase::*;
        match (self, op) {
            (Idle | Received, PhaseOp::RequestComms) => Ok(Issued),
            (Issued, PhaseOp::EndIteration) => Ok(Sent),
            (Sent, PhaseOp::FinishReceive) => Ok(Received),
            (_, PhaseOp::Reset) => Ok(Idle),
            (phase, op) => Err(IoletError::PhaseOrder { op, phase }),
        }
    }

    /// No exchange is in flight.
    pub fn is_drained(self) -> bool {
        matches!(self, IterationPhase::Idle | IterationPhase::Received)
    }
}

impl fmt::Display for IterationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IterationPhase::Idle => "idle",
            IterationPhase::Issued => "issued",
            IterationPhase::Sent => "sent",
            IterationPhase::Received => "received",
        };
        f.write_str(s)
    }
}

impl fmt::Display for PhaseOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhaseOp::RequestComms => "request comms",
            PhaseOp::EndIteration => "end iteration",
            PhaseOp::FinishReceive => "finish receive",
            PhaseOp::Reset => "reset",
        };
        f.write_str(s)
    }
}
