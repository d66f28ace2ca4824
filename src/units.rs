//! Physical ↔ lattice unit conversion used when initialising iolets.

use serde::{Deserialize, Serialize};

pub const MMHG_TO_PASCAL: f64 = 133.322_387_4;
/// kg/m³
pub const BLOOD_DENSITY: f64 = 1000.0;
/// Lattice speed of sound squared.
pub const CS2: f64 = 1.0 / 3.0;
/// Lattice density at the reference pressure.
pub const REFERENCE_DENSITY: f64 = 1.0;

/// Scales for one simulation: lattice spacing, timestep, reference pressure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitConverter {
    voxel_size_m: f64,
    time_step_s: f64,
    reference_pressure_mmhg: f64,
}

impl UnitConverter {
    pub fn new(voxel_size_m: f64, time_step_s: f64, reference_pressure_mmhg: f64) -> Self {
        Self {
            voxel_size_m,
            time_step_s,
            reference_pressure_mmhg,
        }
    }

    pub fn voxel_size_m(&self) -> f64 {
        self.voxel_size_m
    }

    pub fn time_step_s(&self) -> f64 {
        self.time_step_s
    }

    pub fn reference_pressure_mmhg(&self) -> f64 {
        self.reference_pressure_mmhg
    }

    /// Pressure in mmHg → lattice pressure.
    pub fn pressure_to_lattice(&self, pressure_mmhg: f64) -> f64 {
        let scale = (self.time_step_s / self.voxel_size_m).powi(2) / BLOOD_DENSITY;
        CS2 * REFERENCE_DENSITY
            + (pressure_mmhg - self.reference_pressure_mmhg) * MMHG_TO_PASCAL * scale
    }

    /// Pressure in mmHg → lattice density (ρ = p / c_s²).
    pub fn pressure_to_lattice_density(&self, pressure_mmhg: f64) -> f64 {
        self.pressure_to_lattice(pressure_mmhg) / CS2
    }

    /// Change in pressure (mmHg) → change in lattice density; no reference offset.
    pub fn pressure_delta_to_lattice_density(&self, delta_mmhg: f64) -> f64 {
        let scale = (self.time_step_s / self.voxel_size_m).powi(2) / BLOOD_DENSITY;
        delta_mmhg * MMHG_TO_PASCAL * scale / CS2
    }

    /// m/s → lattice units per step.
    pub fn velocity_to_lattice(&self, speed_m_s: f64) -> f64 {
        speed_m_s * self.time_step_s / self.voxel_size_m
    }

    /// Metres → lattice spacings.
    pub fn length_to_lattice(&self, length_m: f64) -> f64 {
        length_m / self.voxel_size_m
    }

    /// Seconds → number of timesteps (fractional).
    pub fn time_to_steps(&self, time_s: f64) -> f64 {
        time_s / self.time_step_s
    }
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::new(1e-4, 1e-4, 80.0)
    }
}
