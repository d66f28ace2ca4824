//! Per-iolet channel between the coordinator and the ranks that own the iolet.
//!
//! The coordinator sends one [`WireDensity`] per exchange to every member
//! rank except itself; each non-coordinator member posts one receive from the
//! coordinator. Handles stay pending until `finish_send`/`wait` complete them.

use std::fmt;

use crate::algs::communicator::{Communicator, Wait};
use crate::algs::wire::{WireDensity, cast_slice, decode_one};
use crate::iolet_error::IoletError;

pub struct BoundaryComms<C: Communicator> {
    iolet: usize,
    /// Owning ranks, ascending; only populated on the coordinator.
    membership: Vec<usize>,
    is_coordinator: bool,
    coordinator_rank: usize,
    tag: u16,
    pending_sends: Vec<C::SendHandle>,
    pending_recv: Option<C::RecvHandle>,
    /// Why the last receive failed; cleared only by `discard_failure`.
    failure: Option<String>,
}

impl<C: Communicator> BoundaryComms<C> {
    pub fn new(
        iolet: usize,
        membership: Vec<usize>,
        is_coordinator: bool,
        coordinator_rank: usize,
        tag: u16,
    ) -> Self {
        Self {
            iolet,
            membership,
            is_coordinator,
            coordinator_rank,
            tag,
            pending_sends: Vec::new(),
            pending_recv: None,
            failure: None,
        }
    }

    pub fn membership(&self) -> &[usize] {
        &self.membership
    }

    pub fn is_coordinator(&self) -> bool {
        self.is_coordinator
    }

    pub fn tag(&self) -> u16 {
        self.tag
    }

    /// No send or receive outstanding.
    pub fn is_drained(&self) -> bool {
        self.pending_sends.is_empty() && self.pending_recv.is_none()
    }

    /// The last receive failed and its value was lost.
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Forget a failed receive so the channel can be used again.
    pub fn discard_failure(&mut self) {
        if let Some(reason) = self.failure.take() {
            log::debug!("iolet {}: discarding failed receive: {}", self.iolet, reason);
        }
    }

    fn check_failure(&self) -> Result<(), IoletError> {
        match &self.failure {
            Some(reason) => Err(IoletError::comm(
                self.coordinator_rank,
                format!("iolet {}: earlier receive failed: {}", self.iolet, reason),
            )),
            None => Ok(()),
        }
    }

    /// Start one exchange: the coordinator sends `density`, members receive.
    pub fn issue(&mut self, comm: &C, zero_step: u64, density: f64) -> Result<(), IoletError> {
        self.check_failure()?;
        if self.is_coordinator {
            self.send(comm, zero_step, density);
            Ok(())
        } else {
            self.receive(comm)
        }
    }

    fn send(&mut self, comm: &C, zero_step: u64, density: f64) {
        let wire = [WireDensity::new(zero_step, density)];
        let me = comm.rank();
        for &peer in self.membership.iter().filter(|&&r| r != me) {
            log::trace!(
                "iolet {}: rank {} sends density {} for step {} to {}",
                self.iolet,
                me,
                density,
                zero_step,
                peer
            );
            self.pending_sends
                .push(comm.isend(peer, self.tag, cast_slice(&wire)));
        }
    }

    fn receive(&mut self, comm: &C) -> Result<(), IoletError> {
        if self.pending_recv.is_some() {
            return Err(IoletError::comm(
                self.coordinator_rank,
                format!("iolet {}: receive already outstanding", self.iolet),
            ));
        }
        let mut buf = [0u8; std::mem::size_of::<WireDensity>()];
        self.pending_recv = Some(comm.irecv(self.coordinator_rank, self.tag, &mut buf));
        Ok(())
    }

    /// Complete every outstanding send.
    pub fn finish_send(&mut self) {
        for h in self.pending_sends.drain(..) {
            h.wait();
        }
    }

    /// Block until the outstanding receive (if any) completes.
    ///
    /// A failed receive stays failed: every later `issue` or `wait` returns an
    /// error until [`discard_failure`](Self::discard_failure) is called.
    pub fn wait(&mut self) -> Result<Option<WireDensity>, IoletError> {
        self.check_failure()?;
        let Some(h) = self.pending_recv.take() else {
            return Ok(None);
        };
        let decoded = match h.wait() {
            Some(data) => decode_one::<WireDensity>(&data),
            None => Err(IoletError::comm(
                self.coordinator_rank,
                format!("iolet {}: no density received", self.iolet),
            )),
        };
        match decoded {
            Ok(wire) => Ok(Some(wire)),
            Err(e) => {
                log::warn!("iolet {}: receive failed: {}", self.iolet, e);
                self.failure = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Complete all sends and the receive.
    pub fn wait_all_comms(&mut self) -> Result<Option<WireDensity>, IoletError> {
        self.finish_send();
        self.wait()
    }
}

impl<C: Communicator> fmt::Debug for BoundaryComms<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundaryComms")
            .field("iolet", &self.iolet)
            .field("membership", &self.membership)
            .field("is_coordinator", &self.is_coordinator)
            .field("coordinator_rank", &self.coordinator_rank)
            .field("tag", &self.tag)
            .field("pending_sends", &self.pending_sends.len())
            .field("pending_recv", &self.pending_recv.is_some())
            .field("failed", &self.failure.is_some())
            .finish()
    }
}
