//! Pressure iolet oscillating as a cosine about a mean.

use std::f64::consts::TAU;

use crate::iolet_error::IoletError;
use crate::iolets::IoletCondition;
use crate::units::UnitConverter;

/// `p(t) = mean + amplitude · cos(2π t / period + phase)`, in mmHg.
///
/// Every rank evaluates the same closed form, so no values are exchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct CosinePressureIolet {
    mean_mmhg: f64,
    amplitude_mmhg: f64,
    phase_rad: f64,
    period_s: f64,
    // lattice units, set by `initialise`
    density_mean: f64,
    density_amplitude: f64,
    period_steps: f64,
    initialised: bool,
}

impl CosinePressureIolet {
    pub fn new(mean_mmhg: f64, amplitude_mmhg: f64, phase_rad: f64, period_s: f64) -> Self {
        Self {
            mean_mmhg,
            amplitude_mmhg,
            phase_rad,
            period_s,
            density_mean: 0.0,
            density_amplitude: 0.0,
            period_steps: 0.0,
            initialised: false,
        }
    }

    pub fn mean_mmhg(&self) -> f64 {
        self.mean_mmhg
    }

    pub fn amplitude_mmhg(&self) -> f64 {
        self.amplitude_mmhg
    }

    pub fn period_s(&self) -> f64 {
        self.period_s
    }
}

impl IoletCondition for CosinePressureIolet {
    fn initialise(&mut self, units: &UnitConverter) -> Result<(), IoletError> {
        if !(self.period_s > 0.0) {
            return Err(IoletError::InvalidConfig(format!(
                "cosine pressure period must be positive, got {}",
                self.period_s
            )));
        }
        self.density_mean = units.pressure_to_lattice_density(self.mean_mmhg);
        self.density_amplitude = units.pressure_delta_to_lattice_density(self.amplitude_mmhg);
        self.period_steps = units.time_to_steps(self.period_s);
        self.initialised = true;
        Ok(())
    }

    /// Before `initialise` there is no period in steps; the mean is returned.
    fn density(&self, zero_step: u64) -> f64 {
        if !self.initialised {
            return self.density_mean;
        }
        let w = TAU / self.period_steps;
        self.density_mean + self.density_amplitude * (w * zero_step as f64 + self.phase_rad).cos()
    }

    fn density_min(&self) -> f64 {
        self.density_mean - self.density_amplitude.abs()
    }

    fn density_max(&self) -> f64 {
        self.density_mean + self.density_amplitude.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::REFERENCE_DENSITY;

    fn initialised(mean: f64, amp: f64) -> CosinePressureIolet {
        // 100 steps per period
        let units = UnitConverter::new(1e-3, 1e-2, 80.0);
        let mut i = CosinePressureIolet::new(mean, amp, 0.0, 1.0);
        i.initialise(&units).unwrap();
        i
    }

    #[test]
    fn density_peaks_at_phase_zero_and_is_periodic() {
        let i = initialised(80.0, 2.0);
        assert!((i.density(0) - i.density_max()).abs() < 1e-12);
        assert!((i.density(50) - i.density_min()).abs() < 1e-12);
        assert!((i.density(100) - i.density(0)).abs() < 1e-12);
    }

    #[test]
    fn bounds_straddle_mean() {
        let i = initialised(80.0, -3.0);
        assert!(i.density_min() < REFERENCE_DENSITY);
        assert!(i.density_max() > REFERENCE_DENSITY);
        assert!(((i.density_min() + i.density_max()) / 2.0 - REFERENCE_DENSITY).abs() < 1e-12);
    }

    #[test]
    fn uninitialised_density_is_finite() {
        let i = CosinePressureIolet::new(80.0, 2.0, 0.0, 0.6);
        assert_eq!(i.density(7), 0.0);
        let j = initialised(80.0, 2.0);
        assert!(j.density(7).is_finite());
    }

    #[test]
    fn rejects_non_positive_period() {
        let mut i = CosinePressureIolet::new(80.0, 1.0, 0.0, 0.0);
        assert!(matches!(
            i.initialise(&UnitConverter::default()),
            Err(IoletError::InvalidConfig(_))
        ));
    }
}
