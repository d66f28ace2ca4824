//! IoletError: Unified error type for iolet-exchange public APIs
//!
//! Every fallible operation in the crate returns this type. Collective
//! divergence between ranks is not represented here: it hangs rather than
//! fails, and is prevented by the fixed construction order.

use thiserror::Error;

use crate::boundary_values::phase::{IterationPhase, PhaseOp};

/// Boxed, stringly-typed communication failure.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CommError(pub String);

/// Unified error type for iolet-exchange operations.
#[derive(Debug, Error)]
pub enum IoletError {
    /// Requested a descriptor outside `[0, total)`.
    #[error("iolet index {index} out of range (total iolets: {total})")]
    IoletIndexOutOfRange { index: usize, total: usize },
    /// A locally relevant iolet that needs comms has no channel attached.
    #[error("iolet {iolet} is locally relevant and requires comms but has no channel")]
    MissingComms { iolet: usize },
    /// A phase method was called from a phase that does not allow it.
    #[error("cannot {op} while in phase {phase}")]
    PhaseOrder { op: PhaseOp, phase: IterationPhase },
    /// A point-to-point or collective exchange with `peer` failed.
    #[error("communication with rank {peer} failed: {source}")]
    CommError {
        peer: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A message arrived with an unexpected size or layout.
    #[error("wire error: {0}")]
    Wire(String),
    /// The iolet's tag does not fit in its kind's tag range.
    #[error("message tag overflow: base tag {base_tag:#06x} + iolet {iolet}")]
    TagOverflow { base_tag: u16, iolet: usize },
    /// Configured coordinator rank is not part of the run.
    #[error("coordinator rank {coordinator} is not a valid rank (size {size})")]
    InvalidCoordinator { coordinator: usize, size: usize },
    /// The communicator reported a rank outside its own size.
    #[error("rank {rank} is outside the run (size {size})")]
    InvalidRank { rank: usize, size: usize },
    /// Iolet parameters that cannot produce a boundary condition.
    #[error("invalid iolet configuration: {0}")]
    InvalidConfig(String),
    /// A pressure trace line could not be parsed.
    #[error("pressure trace line {line}: {reason}")]
    ParseTrace { line: usize, reason: String },
    /// Reading a pressure trace from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoletError {
    pub(crate) fn comm(peer: usize, msg: impl Into<String>) -> Self {
        IoletError::CommError {
            peer,
            source: Box::new(CommError(msg.into())),
        }
    }
}
