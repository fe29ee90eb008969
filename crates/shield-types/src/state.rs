// ─────────────────────────────────────────────────────────────────────
// SCPN Dipole Shield — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{ShieldError, ShieldResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Particle phase-space state: (x, y, z, vx, vy, vz) in m and m/s.
pub type ParticleState = [f64; 6];

/// Position part of a particle state.
pub fn position(state: &ParticleState) -> [f64; 3] {
    [state[0], state[1], state[2]]
}

/// Velocity part of a particle state.
pub fn velocity(state: &ParticleState) -> [f64; 3] {
    [state[3], state[4], state[5]]
}

/// Distance from the origin (dipole location).
pub fn radius(state: &ParticleState) -> f64 {
    (state[0] * state[0] + state[1] * state[1] + state[2] * state[2]).sqrt()
}

/// Speed |v|.
pub fn speed(state: &ParticleState) -> f64 {
    (state[3] * state[3] + state[4] * state[4] + state[5] * state[5]).sqrt()
}

/// Step bookkeeping of one adaptive integration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SolverStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub rhs_evaluations: usize,
    /// Smallest accepted step [s]; 0 when no step was taken.
    ///
    /// Includes the self-starting steps at launch, which are usually the
    /// smallest of the run. Use the sample spacing of the trajectory to see
    /// how the step varies along the orbit.
    pub min_step: f64,
    /// Largest accepted step [s].
    pub max_step: f64,
}

/// Time-ordered particle trajectory for one energy.
///
/// Invariants: at least one sample, `times` strictly increasing,
/// `times.len() == states.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    times: Vec<f64>,
    states: Vec<ParticleState>,
    stats: SolverStats,
}

impl Trajectory {
    pub fn new(
        times: Vec<f64>,
        states: Vec<ParticleState>,
        stats: SolverStats,
    ) -> ShieldResult<Self> {
        if times.is_empty() {
            return Err(ShieldError::PhysicsViolation(
                "trajectory requires at least one sample".to_string(),
            ));
        }
        if times.len() != states.len() {
            return Err(ShieldError::PhysicsViolation(format!(
                "trajectory length mismatch: times={}, states={}",
                times.len(),
                states.len()
            )));
        }
        if let Some(idx) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ShieldError::PhysicsViolation(format!(
                "trajectory times must be strictly increasing (index {})",
                idx + 1
            )));
        }
        Ok(Trajectory {
            times,
            states,
            stats,
        })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[ParticleState] {
        &self.states
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// Number of stored samples, always at least one.
    pub fn num_samples(&self) -> usize {
        self.times.len()
    }

    pub fn initial_state(&self) -> &ParticleState {
        &self.states[0]
    }

    pub fn final_state(&self) -> &ParticleState {
        &self.states[self.states.len() - 1]
    }

    pub fn final_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Samples as an `(n, 7)` array with columns `t, x, y, z, vx, vy, vz`.
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.num_samples(), 7), |(i, j)| {
            if j == 0 {
                self.times[i]
            } else {
                self.states[i][j - 1]
            }
        })
    }
}

/// Per-energy diagnostics of a finished trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyResult {
    pub energy_kev: f64,
    /// Angle of the final velocity's x–z projection to the x-axis [deg].
    pub deflection_angle_deg: f64,
    pub min_distance_m: f64,
    pub closest_approach_time_s: f64,
    /// Analytic gyroradius at the protected-size field strength [m].
    pub larmor_radius_m: f64,
    pub near_miss: bool,
    /// max |(|v(t)| - |v0|)| / |v0| over all samples.
    pub max_relative_speed_drift: f64,
}
