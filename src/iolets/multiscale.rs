//! Pressure iolet whose value comes from an external coupled model.
//!
//! Only the coordinator learns the coupled pressure (through
//! [`MultiscalePressureIolet::set_pressure`]); it converts it to a lattice
//! density and sends it to every rank that owns the iolet once per step.

use crate::iolet_error::IoletError;
use crate::iolets::IoletCondition;
use crate::state::SimulationState;
use crate::units::UnitConverter;

#[derive(Clone, Debug, PartialEq)]
pub struct MultiscalePressureIolet {
    pressure_mmhg: f64,
    min_mmhg: f64,
    max_mmhg: f64,
    units: Option<UnitConverter>,
    density: f64,
    density_min: f64,
    density_max: f64,
    /// Step the current density was received for; `None` if computed locally.
    received_step: Option<u64>,
}

impl MultiscalePressureIolet {
    pub fn new(pressure_mmhg: f64, min_mmhg: f64, max_mmhg: f64) -> Self {
        Self {
            pressure_mmhg,
            min_mmhg,
            max_mmhg,
            units: None,
            density: 0.0,
            density_min: 0.0,
            density_max: 0.0,
            received_step: None,
        }
    }

    pub fn pressure_mmhg(&self) -> f64 {
        self.pressure_mmhg
    }

    /// Update the coupled pressure; clamped to the configured bounds.
    pub fn set_pressure(&mut self, pressure_mmhg: f64) {
        self.pressure_mmhg = pressure_mmhg.clamp(self.min_mmhg, self.max_mmhg);
        self.refresh_density();
    }

    pub fn received_step(&self) -> Option<u64> {
        self.received_step
    }

    fn refresh_density(&mut self) {
        if let Some(units) = &self.units {
            self.density = units.pressure_to_lattice_density(self.pressure_mmhg);
            self.received_step = None;
        }
    }
}

impl IoletCondition for MultiscalePressureIolet {
    fn initialise(&mut self, units: &UnitConverter) -> Result<(), IoletError> {
        if self.min_mmhg > self.max_mmhg {
            return Err(IoletError::InvalidConfig(format!(
                "multiscale pressure bounds inverted: min {} > max {}",
                self.min_mmhg, self.max_mmhg
            )));
        }
        self.density_min = units.pressure_to_lattice_density(self.min_mmhg);
        self.density_max = units.pressure_to_lattice_density(self.max_mmhg);
        self.units = Some(units.clone());
        self.set_pressure(self.pressure_mmhg);
        Ok(())
    }

    fn requires_comms(&self) -> bool {
        true
    }

    fn reset(&mut self, _state: &SimulationState) {
        self.refresh_density();
    }

    fn density(&self, _zero_step: u64) -> f64 {
        self.density
    }

    fn density_min(&self) -> f64 {
        self.density_min
    }

    fn density_max(&self) -> f64 {
        self.density_max
    }

    fn accept_density(&mut self, zero_step: u64, density: f64) {
        self.density = density;
        self.received_step = Some(zero_step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialised() -> MultiscalePressureIolet {
        let mut i = MultiscalePressureIolet::new(80.0, 70.0, 90.0);
        i.initialise(&UnitConverter::default()).unwrap();
        i
    }

    #[test]
    fn set_pressure_clamps_to_bounds() {
        let mut i = initialised();
        i.set_pressure(120.0);
        assert_eq!(i.pressure_mmhg(), 90.0);
        assert_eq!(i.density(0), i.density_max());
        i.set_pressure(10.0);
        assert_eq!(i.density(0), i.density_min());
    }

    #[test]
    fn reset_discards_received_value() {
        let mut i = initialised();
        let local = i.density(0);
        i.accept_density(4, 1.5);
        assert_eq!((i.density(4), i.received_step()), (1.5, Some(4)));
        i.reset(&SimulationState::new(10, 1e-4));
        assert_eq!((i.density(4), i.received_step()), (local, None));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut i = MultiscalePressureIolet::new(80.0, 90.0, 70.0);
        assert!(i.initialise(&UnitConverter::default()).is_err());
    }
}
