//! Simulation clock shared with the numeric kernel.

use serde::{Deserialize, Serialize};

/// Timestep bookkeeping owned by the simulation driver.
///
/// `time_step` is 1-based: the first step of a run is step 1. Boundary
/// densities are indexed by the 0-based [`SimulationState::zero_indexed_time_step`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    time_step: u64,
    total_time_steps: u64,
    time_step_length_s: f64,
}

impl SimulationState {
    pub fn new(total_time_steps: u64, time_step_length_s: f64) -> Self {
        Self {
            time_step: 1,
            total_time_steps,
            time_step_length_s,
        }
    }

    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    pub fn zero_indexed_time_step(&self) -> u64 {
        self.time_step.saturating_sub(1)
    }

    pub fn total_time_steps(&self) -> u64 {
        self.total_time_steps
    }

    pub fn time_step_length_s(&self) -> f64 {
        self.time_step_length_s
    }

    /// Elapsed physical time at the start of the current step.
    pub fn time_s(&self) -> f64 {
        self.zero_indexed_time_step() as f64 * self.time_step_length_s
    }

    pub fn increment(&mut self) {
        self.time_step += 1;
    }

    /// Rewind to the first step (e.g. after a restart).
    pub fn reset(&mut self) {
        self.time_step = 1;
    }

    pub fn is_finished(&self) -> bool {
        self.time_step > self.total_time_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_indexed_lags_by_one() {
        let mut s = SimulationState::new(3, 1e-4);
        assert_eq!((s.time_step(), s.zero_indexed_time_step()), (1, 0));
        s.increment();
        s.increment();
        assert_eq!((s.time_step(), s.zero_indexed_time_step()), (3, 2));
        assert!(!s.is_finished());
        s.increment();
        assert!(s.is_finished());
        s.reset();
        assert_eq!(s.time_step(), 1);
    }
}
