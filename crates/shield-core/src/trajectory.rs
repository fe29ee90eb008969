// ─────────────────────────────────────────────────────────────────────
// SCPN Dipole Shield — Trajectory Integrator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Adaptive integration of a particle state over a fixed time span.
//!
//! Steps shrink automatically where the local error estimate grows, which
//! is near closest approach where |B| and its gradient scale as r⁻³ and
//! r⁻⁴, and grow again (capped per step) once the particle recedes.

use shield_math::dopri::{integrate_dopri5, OdeSystem};
use shield_types::config::{StepControl, SweepConfig, Tolerances};
use shield_types::error::ShieldResult;
use shield_types::state::{ParticleState, Trajectory};

/// Tolerances and step controller for one trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntegratorSettings {
    pub tolerances: Tolerances,
    pub step_control: StepControl,
}

impl IntegratorSettings {
    pub fn new(tolerances: Tolerances, step_control: StepControl) -> Self {
        IntegratorSettings {
            tolerances,
            step_control,
        }
    }

    pub fn from_config(config: &SweepConfig) -> Self {
        Self::new(config.tolerances, config.step_control)
    }
}

/// Integrate `initial` over `time_span` and keep every accepted sample.
pub fn integrate_trajectory<S>(
    initial: ParticleState,
    time_span: (f64, f64),
    system: &S,
    settings: &IntegratorSettings,
) -> ShieldResult<Trajectory>
where
    S: OdeSystem<6> + ?Sized,
{
    let solution = integrate_dopri5(
        system,
        time_span,
        initial,
        &settings.tolerances,
        &settings.step_control,
    )?;
    Trajectory::new(solution.t, solution.y, solution.stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::LorentzSystem;
    use shield_types::config::{DipoleParameters, PhysicalConstants};
    use shield_types::constants::{M_ELECTRON, Q_ELECTRON};
    use shield_types::error::ShieldError;
    use shield_types::state::{radius, speed};

    fn system(moment: f64) -> LorentzSystem {
        let dipole = DipoleParameters::new(moment, &PhysicalConstants::default(), 0.1);
        LorentzSystem::new(dipole, M_ELECTRON, Q_ELECTRON).expect("valid system")
    }

    #[test]
    fn test_first_sample_is_initial_condition() {
        let initial = [-1.0, 0.0, 0.01, 5.0e7, 0.0, 0.0];
        let traj = integrate_trajectory(
            initial,
            (0.0, 5.0e-8),
            &system(1.0),
            &IntegratorSettings::default(),
        )
        .expect("trajectory");
        assert_eq!(*traj.initial_state(), initial);
        assert_eq!(traj.times()[0], 0.0);
        assert_eq!(traj.final_time(), 5.0e-8);
        assert_eq!(traj.num_samples(), traj.stats().accepted_steps + 1);
    }

    fn step_sizes(traj: &Trajectory) -> Vec<f64> {
        traj.times().windows(2).map(|w| w[1] - w[0]).collect()
    }

    #[test]
    fn test_steps_shrink_at_closest_approach_and_grow_after() {
        let initial = [-2.0, 0.0, 0.01, 5.9e7, 0.0, 0.0];
        let settings = IntegratorSettings::default();
        let traj = integrate_trajectory(initial, (0.0, 1.0e-7), &system(1.066), &settings)
            .expect("trajectory");
        let radii: Vec<f64> = traj.states().iter().map(radius).collect();
        let steps = step_sizes(&traj);
        let i_min = radii
            .iter()
            .enumerate()
            .fold(0, |best, (i, &r)| if r < radii[best] { i } else { best });
        assert!(radii[i_min] < 0.3, "closest approach {:e} m", radii[i_min]);
        assert!(i_min > 0 && i_min + 1 < traj.num_samples());

        // Largest step on each leg while the particle is beyond 1 m. Taking the
        // maximum skips the self-starting steps at launch.
        let far_step = |range: std::ops::Range<usize>| {
            range
                .filter(|&i| radii[i] > 1.0 && radii[i + 1] > 1.0)
                .map(|i| steps[i])
                .fold(0.0_f64, f64::max)
        };
        let inbound = far_step(0..i_min);
        let outbound = far_step(i_min..steps.len());
        let near = steps[i_min - 1].max(steps[i_min]);

        assert!(
            2.5 * near < inbound,
            "step at closest approach {near:e} vs inbound {inbound:e}"
        );
        assert!(
            10.0 * near < outbound,
            "step at closest approach {near:e} vs outbound {outbound:e}"
        );

        let v0 = speed(&initial);
        for s in traj.states() {
            let drift = (speed(s) - v0).abs() / v0;
            assert!(drift < 100.0 * settings.tolerances.rtol, "speed drift {drift:e}");
        }
    }

    #[test]
    fn test_min_step_stat_matches_sample_spacing() {
        let initial = [-2.0, 0.0, 0.01, 5.9e7, 0.0, 0.0];
        let traj = integrate_trajectory(
            initial,
            (0.0, 1.0e-7),
            &system(1.066),
            &IntegratorSettings::default(),
        )
        .expect("trajectory");
        let steps = step_sizes(&traj);
        let smallest = steps.iter().copied().fold(f64::INFINITY, f64::min);
        let largest = steps.iter().copied().fold(0.0_f64, f64::max);
        let stats = traj.stats();
        assert!((stats.min_step - smallest).abs() <= 1e-6 * smallest);
        assert!((stats.max_step - largest).abs() <= 1e-6 * largest);
        // The self-starting first step is part of the statistic.
        assert!(stats.min_step <= steps[0] * (1.0 + 1e-6));
    }

    #[test]
    fn test_invalid_span_is_config_error() {
        let err = integrate_trajectory(
            [-1.0, 0.0, 0.0, 1.0e7, 0.0, 0.0],
            (1.0e-7, 0.0),
            &system(1.0),
            &IntegratorSettings::default(),
        )
        .expect_err("reversed span must fail");
        assert!(matches!(err, ShieldError::ConfigError(_)));
    }

    #[test]
    fn test_head_on_axial_collision_is_singular() {
        // Straight down the moment axis with no field: the particle hits the
        // origin exactly and the field evaluation must refuse it.
        let initial = [0.0, 0.0, -1.0, 0.0, 0.0, 1.0e7];
        let settings = IntegratorSettings {
            step_control: StepControl {
                initial_step: Some(1.0e-8),
                max_step: Some(1.0e-8),
                ..StepControl::default()
            },
            ..IntegratorSettings::default()
        };
        let err = integrate_trajectory(initial, (0.0, 2.0e-7), &system(0.0), &settings)
            .expect_err("trajectory through the origin must fail");
        assert!(matches!(err, ShieldError::SingularField { .. }));
    }
}
