//! Boundary values for every iolet of one kind on this rank.
//!
//! Construction discovers, once, which ranks own which iolet, attaches a
//! channel to every locally relevant iolet and performs an initial
//! [`BoundaryValues::reset`]. After that the simulation driver sequences the
//! four phase operations:
//!
//! 1. [`request_comms`](BoundaryValues::request_comms) issues this step's exchanges,
//! 2. [`end_iteration`](BoundaryValues::end_iteration) completes outstanding sends,
//! 3. [`finish_receive`](BoundaryValues::finish_receive) blocks until values arrive,
//! 4. [`reset`](BoundaryValues::reset) resynchronises at construction and at checkpoints.
//!
//! Densities read through the accessors are only current for a step once
//! `finish_receive` has returned for that step. Every rank must make the same
//! sequence of calls; a rank that skips a call stalls its peers.

pub mod descriptor;
pub mod phase;

pub use descriptor::BoundaryDescriptor;
pub use phase::{IterationPhase, PhaseOp};

use crate::algs::communicator::Communicator;
use crate::algs::locality::is_iolet_on_this_rank;
use crate::algs::membership::gather_membership;
use crate::config::BoundaryConfig;
use crate::iolet_error::IoletError;
use crate::iolets::{BoundaryComms, Iolet, IoletCondition};
use crate::lattice::{IoletKind, LatticeSites};
use crate::process_topology::ProcessTopology;
use crate::state::SimulationState;
use crate::units::UnitConverter;

pub struct BoundaryValues<'c, C: Communicator> {
    kind: IoletKind,
    comm: &'c C,
    topology: ProcessTopology,
    descriptors: Vec<BoundaryDescriptor<C>>,
    /// Locally relevant iolets, ascending.
    local_iolet_ids: Vec<usize>,
    phase: IterationPhase,
}

impl<'c, C: Communicator> BoundaryValues<'c, C> {
    /// Build the descriptor set for every iolet of `kind`.
    ///
    /// Collective over `comm`: every rank must call this with the same
    /// templates and config. Template initialisation and tag assignment
    /// depend only on those inputs, so an error from either is raised on
    /// every rank at the same iolet.
    pub fn new<L>(
        kind: IoletKind,
        lattice: &L,
        templates: &[Iolet],
        units: &UnitConverter,
        state: &SimulationState,
        comm: &'c C,
        config: &BoundaryConfig,
    ) -> Result<Self, IoletError>
    where
        L: LatticeSites + ?Sized,
    {
        let topology = ProcessTopology::from_comm(comm, config.coordinator_rank)?;
        if let Some(last) = templates.len().checked_sub(1) {
            config.tag_for(kind, last)?;
        }

        let mut descriptors = Vec::with_capacity(templates.len());
        let mut local_iolet_ids = Vec::new();
        for (index, template) in templates.iter().enumerate() {
            let mut iolet = template.clone();
            iolet.initialise(units)?;

            let on_this_rank = is_iolet_on_this_rank(kind, lattice, index);
            let membership = gather_membership(comm, topology.coordinator_rank(), on_this_rank)?;
            log::debug!(
                "rank {}: {:?} iolet {} ({}) local: {}, members: {:?}",
                topology.rank(),
                kind,
                index,
                iolet.name(),
                on_this_rank,
                membership
            );

            let comms = if on_this_rank || topology.is_coordinator() {
                local_iolet_ids.push(index);
                Some(BoundaryComms::new(
                    index,
                    membership,
                    topology.is_coordinator(),
                    topology.coordinator_rank(),
                    config.tag_for(kind, index)?,
                ))
            } else {
                None
            };
            descriptors.push(BoundaryDescriptor::new(index, iolet, comms));
        }

        match local_iolet_ids.first() {
            Some(first) => log::debug!(
                "rank {}: {} of {} {:?} iolets local, first id {}",
                topology.rank(),
                local_iolet_ids.len(),
                descriptors.len(),
                kind,
                first
            ),
            None => log::debug!(
                "rank {}: none of {} {:?} iolets local",
                topology.rank(),
                descriptors.len(),
                kind
            ),
        }

        let mut values = Self {
            kind,
            comm,
            topology,
            descriptors,
            local_iolet_ids,
            phase: IterationPhase::Idle,
        };
        values.reset(state)?;
        Ok(values)
    }

    /// Issue this step's exchange on every local iolet that needs comms.
    pub fn request_comms(&mut self, state: &SimulationState) -> Result<(), IoletError> {
        let next = self.phase.next(PhaseOp::RequestComms)?;
        let step = state.zero_indexed_time_step();
        for &id in &self.local_iolet_ids {
            let d = &mut self.descriptors[id];
            if d.requires_comms() {
                d.issue(self.comm, step)?;
            }
        }
        self.phase = next;
        Ok(())
    }

    /// Complete every outstanding send.
    pub fn end_iteration(&mut self) -> Result<(), IoletError> {
        let next = self.phase.next(PhaseOp::EndIteration)?;
        for &id in &self.local_iolet_ids {
            let d = &mut self.descriptors[id];
            if d.requires_comms() {
                d.finish_send()?;
            }
        }
        self.phase = next;
        Ok(())
    }

    /// Block until every pending receive completes; values are readable after.
    pub fn finish_receive(&mut self) -> Result<(), IoletError> {
        let next = self.phase.next(PhaseOp::FinishReceive)?;
        for &id in &self.local_iolet_ids {
            let d = &mut self.descriptors[id];
            if d.requires_comms() {
                d.finish_receive()?;
            }
        }
        self.phase = next;
        Ok(())
    }

    /// Full resynchronisation from `state`.
    ///
    /// For each local iolet: discard a failed receive, drain anything
    /// outstanding, reset the iolet's transient state, then (if it needs
    /// comms) exchange the value for the current step and wait until both
    /// sides have completed. Allowed from any phase; leaves every channel
    /// drained. This is the only way back from a failed `finish_receive`.
    pub fn reset(&mut self, state: &SimulationState) -> Result<(), IoletError> {
        let next = self.phase.next(PhaseOp::Reset)?;
        let step = state.zero_indexed_time_step();
        for &id in &self.local_iolet_ids {
            let d = &mut self.descriptors[id];
            d.discard_failure();
            d.drain()?;
            d.iolet_mut().reset(state);
            if d.requires_comms() {
                d.issue(self.comm, step)?;
                d.drain()?;
            }
        }
        self.phase = next;
        log::trace!(
            "rank {}: {:?} boundary values reset at step {}",
            self.topology.rank(),
            self.kind,
            state.time_step()
        );
        Ok(())
    }

    fn descriptor(&self, index: usize) -> Result<&BoundaryDescriptor<C>, IoletError> {
        self.descriptors
            .get(index)
            .ok_or(IoletError::IoletIndexOutOfRange {
                index,
                total: self.descriptors.len(),
            })
    }

    /// Density of iolet `index` at the current 0-based step.
    ///
    /// Only current after `finish_receive` (or `reset`) for this step.
    pub fn density(&self, index: usize, state: &SimulationState) -> Result<f64, IoletError> {
        Ok(self
            .descriptor(index)?
            .iolet()
            .density(state.zero_indexed_time_step()))
    }

    pub fn density_min(&self, index: usize) -> Result<f64, IoletError> {
        Ok(self.descriptor(index)?.iolet().density_min())
    }

    pub fn density_max(&self, index: usize) -> Result<f64, IoletError> {
        Ok(self.descriptor(index)?.iolet().density_max())
    }

    /// Set the coupled pressure of a multiscale iolet.
    ///
    /// Meaningful on the coordinator, whose value the next exchange sends.
    pub fn set_coupled_pressure(&mut self, index: usize, pressure_mmhg: f64) -> Result<(), IoletError> {
        let total = self.descriptors.len();
        let d = self
            .descriptors
            .get_mut(index)
            .ok_or(IoletError::IoletIndexOutOfRange { index, total })?;
        match d.iolet_mut() {
            Iolet::MultiscalePressure(m) => {
                m.set_pressure(pressure_mmhg);
                Ok(())
            }
            other => Err(IoletError::InvalidConfig(format!(
                "iolet {index} is {}, not multiscale",
                other.name()
            ))),
        }
    }

    pub fn iolet(&self, index: usize) -> Result<&Iolet, IoletError> {
        Ok(self.descriptor(index)?.iolet())
    }

    /// Membership seen by this rank for iolet `index`: owning ranks on the
    /// coordinator, empty elsewhere, `None` if the iolet is not local.
    pub fn membership(&self, index: usize) -> Result<Option<&[usize]>, IoletError> {
        Ok(self.descriptor(index)?.comms().map(BoundaryComms::membership))
    }

    pub fn kind(&self) -> IoletKind {
        self.kind
    }

    pub fn topology(&self) -> &ProcessTopology {
        &self.topology
    }

    pub fn phase(&self) -> IterationPhase {
        self.phase
    }

    pub fn total_iolet_count(&self) -> usize {
        self.descriptors.len()
    }

    pub fn local_iolet_count(&self) -> usize {
        self.local_iolet_ids.len()
    }

    pub fn local_iolet_ids(&self) -> &[usize] {
        &self.local_iolet_ids
    }

    pub fn is_local(&self, index: usize) -> bool {
        self.local_iolet_ids.binary_search(&index).is_ok()
    }

    /// `true` if no local channel has a send or receive outstanding.
    pub fn is_drained(&self) -> bool {
        self.local_iolet_ids.iter().all(|&id| {
            self.descriptors[id]
                .comms()
                .is_none_or(BoundaryComms::is_drained)
        })
    }

    /// Drain every channel and release all descriptors.
    ///
    /// Returns the number of descriptors released, which is always
    /// [`total_iolet_count`](Self::total_iolet_count).
    pub fn shutdown(mut self) -> Result<usize, IoletError> {
        for &id in &self.local_iolet_ids {
            self.descriptors[id].drain()?;
        }
        self.phase = IterationPhase::Idle;
        let released = std::mem::take(&mut self.descriptors);
        Ok(released.len())
    }
}

impl<C: Communicator> Drop for BoundaryValues<'_, C> {
    fn drop(&mut self) {
        if !self.phase.is_drained() {
            log::warn!(
                "rank {}: {:?} boundary values dropped in phase {} with exchanges in flight",
                self.topology.rank(),
                self.kind,
                self.phase
            );
        }
    }
}
