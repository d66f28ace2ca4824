//! Serde-facing configuration: coordinator settings and iolet templates.
//!
//! ```json
//! { "coordinator_rank": 0, "base_tag": 45056 }
//! { "type": "cosine_pressure", "mean_mmhg": 80.0, "amplitude_mmhg": 2.0, "period_s": 0.6 }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::iolet_error::IoletError;
use crate::iolets::{
    CosinePressureIolet, FilePressureIolet, Iolet, MultiscalePressureIolet,
    ParabolicVelocityIolet,
};
use crate::lattice::IoletKind;

pub const DEFAULT_BASE_TAG: u16 = 0xB000;

/// Tags reserved per iolet kind; outlet tags start this far above inlet tags.
pub const KIND_TAG_STRIDE: u16 = 0x0800;

/// Settings shared by every rank; must be identical across the run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Rank that gathers membership and distributes coupled values.
    pub coordinator_rank: usize,
    /// Message tag of inlet 0; inlet `i` uses `base_tag + i`, outlet `i`
    /// uses `base_tag + KIND_TAG_STRIDE + i`.
    pub base_tag: u16,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            coordinator_rank: 0,
            base_tag: DEFAULT_BASE_TAG,
        }
    }
}

impl BoundaryConfig {
    pub fn with_coordinator(coordinator_rank: usize) -> Self {
        Self {
            coordinator_rank,
            ..Self::default()
        }
    }

    /// Message tag for iolet `iolet` of `kind`.
    ///
    /// Inlets and outlets never share a tag, so both sets can exchange over
    /// one communicator at the same time.
    pub fn tag_for(&self, kind: IoletKind, iolet: usize) -> Result<u16, IoletError> {
        let kind_offset = match kind {
            IoletKind::Inlet => 0,
            IoletKind::Outlet => KIND_TAG_STRIDE,
        };
        u16::try_from(iolet)
            .ok()
            .filter(|&i| i < KIND_TAG_STRIDE)
            .and_then(|i| self.base_tag.checked_add(kind_offset)?.checked_add(i))
            .ok_or(IoletError::TagOverflow {
                base_tag: self.base_tag,
                iolet,
            })
    }
}

/// One iolet template as written in a configuration file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IoletConfig {
    CosinePressure {
        mean_mmhg: f64,
        #[serde(default)]
        amplitude_mmhg: f64,
        #[serde(default)]
        phase_rad: f64,
        period_s: f64,
    },
    FilePressure {
        path: PathBuf,
    },
    MultiscalePressure {
        pressure_mmhg: f64,
        min_mmhg: f64,
        max_mmhg: f64,
    },
    ParabolicVelocity {
        max_speed_m_s: f64,
        radius_m: f64,
        #[serde(default)]
        period_s: f64,
    },
}

impl IoletConfig {
    /// Build the template; file-backed traces are read here.
    pub fn build(&self) -> Result<Iolet, IoletError> {
        Ok(match *self {
            IoletConfig::CosinePressure {
                mean_mmhg,
                amplitude_mmhg,
                phase_rad,
                period_s,
            } => CosinePressureIolet::new(mean_mmhg, amplitude_mmhg, phase_rad, period_s).into(),
            IoletConfig::FilePressure { ref path } => FilePressureIolet::from_path(path)?.into(),
            IoletConfig::MultiscalePressure {
                pressure_mmhg,
                min_mmhg,
                max_mmhg,
            } => MultiscalePressureIolet::new(pressure_mmhg, min_mmhg, max_mmhg).into(),
            IoletConfig::ParabolicVelocity {
                max_speed_m_s,
                radius_m,
                period_s,
            } => ParabolicVelocityIolet::new(max_speed_m_s, radius_m, period_s).into(),
        })
    }
}

/// Build templates for a list of iolet configs, in order.
pub fn build_templates(configs: &[IoletConfig]) -> Result<Vec<Iolet>, IoletError> {
    configs.iter().map(IoletConfig::build).collect()
}
