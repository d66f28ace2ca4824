//! Velocity iolet with a Poiseuille (parabolic) profile.

use std::f64::consts::TAU;

use crate::iolet_error::IoletError;
use crate::iolets::IoletCondition;
use crate::units::{REFERENCE_DENSITY, UnitConverter};

/// Parabolic inflow profile, optionally pulsed with a raised cosine.
///
/// A velocity iolet prescribes no density, so its density and both bounds
/// are the reference lattice density.
#[derive(Clone, Debug, PartialEq)]
pub struct ParabolicVelocityIolet {
    max_speed_m_s: f64,
    radius_m: f64,
    /// `0.0` for a steady profile.
    period_s: f64,
    max_speed: f64,
    radius: f64,
    period_steps: f64,
}

impl ParabolicVelocityIolet {
    pub fn new(max_speed_m_s: f64, radius_m: f64, period_s: f64) -> Self {
        Self {
            max_speed_m_s,
            radius_m,
            period_s,
            max_speed: 0.0,
            radius: 0.0,
            period_steps: 0.0,
        }
    }

    /// Axial lattice velocity at 0-based step `zero_step`, distance `r`
    /// (lattice units) from the iolet centre.
    pub fn velocity(&self, zero_step: u64, r: f64) -> f64 {
        if self.radius <= 0.0 || r >= self.radius {
            return 0.0;
        }
        let profile = 1.0 - (r / self.radius).powi(2);
        let pulse = if self.period_steps > 0.0 {
            0.5 * (1.0 - (TAU * zero_step as f64 / self.period_steps).cos())
        } else {
            1.0
        };
        self.max_speed * profile * pulse
    }
}

impl IoletCondition for ParabolicVelocityIolet {
    fn initialise(&mut self, units: &UnitConverter) -> Result<(), IoletError> {
        if !(self.radius_m > 0.0) || self.period_s < 0.0 {
            return Err(IoletError::InvalidConfig(format!(
                "velocity iolet needs radius > 0 and period >= 0, got radius {} period {}",
                self.radius_m, self.period_s
            )));
        }
        self.max_speed = units.velocity_to_lattice(self.max_speed_m_s);
        self.radius = units.length_to_lattice(self.radius_m);
        self.period_steps = units.time_to_steps(self.period_s);
        Ok(())
    }

    fn density(&self, _zero_step: u64) -> f64 {
        REFERENCE_DENSITY
    }

    fn density_min(&self) -> f64 {
        REFERENCE_DENSITY
    }

    fn density_max(&self) -> f64 {
        REFERENCE_DENSITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_profile_is_parabolic() {
        let mut i = ParabolicVelocityIolet::new(0.5, 2.0, 0.0);
        i.initialise(&UnitConverter::new(1.0, 0.1, 0.0)).unwrap();
        assert!((i.velocity(7, 0.0) - 0.05).abs() < 1e-12);
        assert!((i.velocity(7, 1.0) - 0.0375).abs() < 1e-12);
        assert_eq!(i.velocity(7, 2.0), 0.0);
        assert_eq!(i.density(7), REFERENCE_DENSITY);
    }

    #[test]
    fn pulsed_profile_starts_at_rest() {
        let mut i = ParabolicVelocityIolet::new(0.5, 2.0, 1.0);
        i.initialise(&UnitConverter::new(1.0, 0.1, 0.0)).unwrap();
        assert_eq!(i.velocity(0, 0.0), 0.0);
        assert!((i.velocity(5, 0.0) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn zero_radius_is_invalid() {
        let mut i = ParabolicVelocityIolet::new(0.5, 0.0, 0.0);
        assert!(i.initialise(&UnitConverter::default()).is_err());
    }
}
