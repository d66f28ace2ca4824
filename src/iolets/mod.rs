//! Boundary-condition variants for inlets and outlets.
//!
//! The set of variants is closed: [`Iolet`] is an enum and every capability
//! of [`IoletCondition`] dispatches with a `match`. A `BoundaryValues` clones
//! a caller-supplied template per iolet and initialises the clone with the
//! run's [`UnitConverter`].

pub mod comms;
pub mod cosine;
pub mod file;
pub mod multiscale;
pub mod velocity;

pub use comms::BoundaryComms;
pub use cosine::CosinePressureIolet;
pub use file::FilePressureIolet;
pub use multiscale::MultiscalePressureIolet;
pub use velocity::ParabolicVelocityIolet;

use crate::iolet_error::IoletError;
use crate::state::SimulationState;
use crate::units::UnitConverter;

/// Capability set shared by every iolet variant.
pub trait IoletCondition {
    /// Convert physical parameters into lattice units.
    fn initialise(&mut self, units: &UnitConverter) -> Result<(), IoletError>;

    /// Whether per-step values must be exchanged between ranks.
    fn requires_comms(&self) -> bool {
        false
    }

    /// Reinitialise transient per-step state from the simulation clock.
    fn reset(&mut self, _state: &SimulationState) {}

    /// Lattice density at 0-based timestep `zero_step`.
    fn density(&self, zero_step: u64) -> f64;

    fn density_min(&self) -> f64;

    fn density_max(&self) -> f64;

    /// Apply a density received from the coordinator for `zero_step`.
    fn accept_density(&mut self, _zero_step: u64, _density: f64) {}
}

/// One inlet or outlet boundary condition.
#[derive(Clone, Debug, PartialEq)]
pub enum Iolet {
    CosinePressure(CosinePressureIolet),
    FilePressure(FilePressureIolet),
    MultiscalePressure(MultiscalePressureIolet),
    ParabolicVelocity(ParabolicVelocityIolet),
}

macro_rules! dispatch {
    ($self:expr, $iolet:ident => $body:expr) => {
        match $self {
            Iolet::CosinePressure($iolet) => $body,
            Iolet::FilePressure($iolet) => $body,
            Iolet::MultiscalePressure($iolet) => $body,
            Iolet::ParabolicVelocity($iolet) => $body,
        }
    };
}

impl IoletCondition for Iolet {
    fn initialise(&mut self, units: &UnitConverter) -> Result<(), IoletError> {
        dispatch!(self, i => i.initialise(units))
    }

    fn requires_comms(&self) -> bool {
        dispatch!(self, i => i.requires_comms())
    }

    fn reset(&mut self, state: &SimulationState) {
        dispatch!(self, i => i.reset(state))
    }

    fn density(&self, zero_step: u64) -> f64 {
        dispatch!(self, i => i.density(zero_step))
    }

    fn density_min(&self) -> f64 {
        dispatch!(self, i => i.density_min())
    }

    fn density_max(&self) -> f64 {
        dispatch!(self, i => i.density_max())
    }

    fn accept_density(&mut self, zero_step: u64, density: f64) {
        dispatch!(self, i => i.accept_density(zero_step, density))
    }
}

impl Iolet {
    /// Short variant name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Iolet::CosinePressure(_) => "cosine-pressure",
            Iolet::FilePressure(_) => "file-pressure",
            Iolet::MultiscalePressure(_) => "multiscale-pressure",
            Iolet::ParabolicVelocity(_) => "parabolic-velocity",
        }
    }
}

impl From<CosinePressureIolet> for Iolet {
    fn from(i: CosinePressureIolet) -> Self {
        Iolet::CosinePressure(i)
    }
}

impl From<FilePressureIolet> for Iolet {
    fn from(i: FilePressureIolet) -> Self {
        Iolet::FilePressure(i)
    }
}

impl From<MultiscalePressureIolet> for Iolet {
    fn from(i: MultiscalePressureIolet) -> Self {
        Iolet::MultiscalePressure(i)
    }
}

impl From<ParabolicVelocityIolet> for Iolet {
    fn from(i: ParabolicVelocityIolet) -> Self {
        Iolet::ParabolicVelocity(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_multiscale_requires_comms() {
        let iolets: Vec<Iolet> = vec![
            CosinePressureIolet::new(80.0, 0.0, 0.0, 1.0).into(),
            FilePressureIolet::from_samples(vec![(0.0, 80.0), (1.0, 81.0)]).into(),
            MultiscalePressureIolet::new(80.0, 70.0, 90.0).into(),
            ParabolicVelocityIolet::new(0.1, 1e-3, 0.0).into(),
        ];
        let flags: Vec<bool> = iolets.iter().map(|i| i.requires_comms()).collect();
        assert_eq!(flags, vec![false, false, true, false]);
    }

    #[test]
    fn cloned_template_initialises_independently() {
        let template: Iolet = CosinePressureIolet::new(90.0, 5.0, 0.0, 1.0).into();
        let mut a = template.clone();
        a.initialise(&UnitConverter::default()).unwrap();
        assert_ne!(a, template);
        assert_eq!(template.name(), "cosine-pressure");
    }
}
