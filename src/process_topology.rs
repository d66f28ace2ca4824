//! Rank layout of the run, injected rather than read from global state.

use crate::algs::communicator::Communicator;
use crate::iolet_error::IoletError;

/// This rank, the number of ranks, and which rank coordinates boundaries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProcessTopology {
    rank: usize,
    size: usize,
    coordinator_rank: usize,
}

impl ProcessTopology {
    pub fn new(rank: usize, size: usize, coordinator_rank: usize) -> Result<Self, IoletError> {
        if rank >= size {
            return Err(IoletError::InvalidRank { rank, size });
        }
        if coordinator_rank >= size {
            return Err(IoletError::InvalidCoordinator {
                coordinator: coordinator_rank,
                size,
            });
        }
        Ok(Self {
            rank,
            size,
            coordinator_rank,
        })
    }

    pub fn from_comm<C: Communicator + ?Sized>(
        comm: &C,
        coordinator_rank: usize,
    ) -> Result<Self, IoletError> {
        Self::new(comm.rank(), comm.size(), coordinator_rank)
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn coordinator_rank(&self) -> usize {
        self.coordinator_rank
    }

    pub fn is_coordinator(&self) -> bool {
        self.rank == self.coordinator_rank
    }
}
