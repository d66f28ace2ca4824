//! # iolet-exchange
//!
//! iolet-exchange coordinates inlet and outlet ("iolet") boundary values for a
//! lattice fluid solver that runs as many cooperating ranks. Each iolet may
//! touch sites owned by any number of ranks; one rank is the coordinator.
//!
//! ## Features
//! - One-off collective discovery of which ranks own which iolet
//! - Per-iolet channels attached only where an iolet is locally relevant
//! - A checked four-phase per-timestep protocol (request, end, finish, reset)
//! - A closed set of boundary-condition variants (cosine, file-driven and
//!   multiscale pressure, parabolic velocity)
//! - Pluggable communication backends (serial, in-process threads, MPI)
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! iolet-exchange = "0.1"
//! # features = ["mpi-support"]
//! ```
//!
//! ```no_run
//! use iolet_exchange::prelude::*;
//!
//! # fn main() -> Result<(), IoletError> {
//! let comm = NoComm;
//! let lattice = InMemoryLattice::with_iolets(16, &[(IoletKind::Inlet, 0)]);
//! let templates: Vec<Iolet> = vec![CosinePressureIolet::new(80.0, 2.0, 0.0, 0.6).into()];
//! let mut state = SimulationState::new(1000, 1e-4);
//! let mut inlets = BoundaryValues::new(
//!     IoletKind::Inlet,
//!     &lattice,
//!     &templates,
//!     &UnitConverter::default(),
//!     &state,
//!     &comm,
//!     &BoundaryConfig::default(),
//! )?;
//! while !state.is_finished() {
//!     inlets.request_comms(&state)?;
//!     inlets.end_iteration()?;
//!     inlets.finish_receive()?;
//!     let _rho = inlets.density(0, &state)?;
//!     state.increment();
//! }
//! inlets.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//! The crate logs through the [`log`] facade (construction at `debug`,
//! per-step exchanges at `trace`) and installs no logger itself.

pub mod algs;
pub mod boundary_values;
pub mod config;
pub mod iolet_error;
pub mod iolets;
pub mod lattice;
pub mod process_topology;
pub mod state;
pub mod units;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::communicator::{Communicator, NoComm, ThreadComm, Wait};
    pub use crate::boundary_values::{BoundaryValues, IterationPhase, PhaseOp};
    pub use crate::config::{BoundaryConfig, IoletConfig};
    pub use crate::iolet_error::IoletError;
    pub use crate::iolets::{
        CosinePressureIolet, FilePressureIolet, Iolet, IoletCondition, MultiscalePressureIolet,
        ParabolicVelocityIolet,
    };
    pub use crate::lattice::{InMemoryLattice, IoletKind, LatticeSites, Site, SiteType};
    pub use crate::process_topology::ProcessTopology;
    pub use crate::state::SimulationState;
    pub use crate::units::UnitConverter;
}
