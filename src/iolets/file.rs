//! Pressure iolet driven by a tabulated pressure trace.
//!
//! Trace files hold two whitespace-separated columns, time in seconds and
//! pressure in mmHg, one sample per line. Blank lines and lines starting with
//! `#` are skipped. The trace repeats with period `last time - first time`.

use std::path::Path;

use crate::iolet_error::IoletError;
use crate::iolets::IoletCondition;
use crate::units::UnitConverter;

#[derive(Clone, Debug, PartialEq)]
pub struct FilePressureIolet {
    /// (time s, pressure mmHg), sorted by time.
    samples: Vec<(f64, f64)>,
    /// (step, lattice density), filled by `initialise`.
    lattice: Vec<(f64, f64)>,
    period_steps: f64,
    density_min: f64,
    density_max: f64,
}

impl FilePressureIolet {
    pub fn from_samples(mut samples: Vec<(f64, f64)>) -> Self {
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            samples,
            lattice: Vec::new(),
            period_steps: 0.0,
            density_min: 0.0,
            density_max: 0.0,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IoletError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, IoletError> {
        let mut samples = Vec::new();
        for (n, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut cols = line.split_whitespace();
            let (Some(t), Some(p), None) = (cols.next(), cols.next(), cols.next()) else {
                return Err(IoletError::ParseTrace {
                    line: n + 1,
                    reason: "expected two columns: time pressure".into(),
                });
            };
            let parse = |s: &str| {
                s.parse::<f64>().map_err(|e| IoletError::ParseTrace {
                    line: n + 1,
                    reason: format!("{s:?}: {e}"),
                })
            };
            samples.push((parse(t)?, parse(p)?));
        }
        Ok(Self::from_samples(samples))
    }

    pub fn samples(&self) -> &[(f64, f64)] {
        &self.samples
    }

    fn interpolate(&self, step: f64) -> f64 {
        let first = self.lattice[0];
        if self.lattice.len() == 1 || self.period_steps <= 0.0 {
            return first.1;
        }
        let t = first.0 + (step - first.0).rem_euclid(self.period_steps);
        let upper = self
            .lattice
            .partition_point(|&(s, _)| s <= t)
            .clamp(1, self.lattice.len() - 1);
        let (s0, d0) = self.lattice[upper - 1];
        let (s1, d1) = self.lattice[upper];
        if s1 <= s0 {
            return d0;
        }
        d0 + (d1 - d0) * (t - s0) / (s1 - s0)
    }
}

impl IoletCondition for FilePressureIolet {
    fn initialise(&mut self, units: &UnitConverter) -> Result<(), IoletError> {
        if self.samples.is_empty() {
            return Err(IoletError::InvalidConfig(
                "pressure trace has no samples".into(),
            ));
        }
        self.lattice = self
            .samples
            .iter()
            .map(|&(t, p)| (units.time_to_steps(t), units.pressure_to_lattice_density(p)))
            .collect();
        let first = self.lattice[0].0;
        let last = self.lattice[self.lattice.len() - 1].0;
        self.period_steps = last - first;
        self.density_min = self
            .lattice
            .iter()
            .map(|&(_, d)| d)
            .fold(f64::INFINITY, f64::min);
        self.density_max = self
            .lattice
            .iter()
            .map(|&(_, d)| d)
            .fold(f64::NEG_INFINITY, f64::max);
        Ok(())
    }

    fn density(&self, zero_step: u64) -> f64 {
        if self.lattice.is_empty() {
            return self.density_min;
        }
        self.interpolate(zero_step as f64)
    }

    fn density_min(&self) -> f64 {
        self.density_min
    }

    fn density_max(&self) -> f64 {
        self.density_max
    }
}
