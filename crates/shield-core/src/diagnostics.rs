// ─────────────────────────────────────────────────────────────────────
// SCPN Dipole Shield — Trajectory Diagnostics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Scalar diagnostics derived from an integrated trajectory.

use crate::field::equatorial_field_magnitude;
use crate::shielding::larmor_radius;
use shield_types::config::{DiagnosticSettings, DipoleParameters};
use shield_types::constants::kev_to_joules;
use shield_types::error::{ShieldError, ShieldResult};
use shield_types::state::{radius, speed, EnergyResult, ParticleState, Trajectory};

/// Closest sampled approach to the dipole: `(distance [m], time [s])`.
///
/// Only accepted samples are considered; the true minimum between two
/// samples may be slightly smaller.
pub fn closest_approach(trajectory: &Trajectory) -> (f64, f64) {
    trajectory
        .times()
        .iter()
        .zip(trajectory.states().iter())
        .fold((f64::INFINITY, 0.0), |(best_r, best_t), (&t, s)| {
            let r = radius(s);
            if r < best_r {
                (r, t)
            } else {
                (best_r, best_t)
            }
        })
}

/// Angle between the velocity's x–z projection and the x-axis [deg].
///
/// The y-component is ignored.
pub fn deflection_angle_deg(state: &ParticleState) -> f64 {
    state[5].atan2(state[3]).to_degrees()
}

/// Largest relative deviation of |v| from its initial value.
pub fn max_relative_speed_drift(trajectory: &Trajectory) -> f64 {
    let v0 = speed(trajectory.initial_state());
    if v0 == 0.0 {
        return 0.0;
    }
    trajectory
        .states()
        .iter()
        .map(|s| (speed(s) - v0).abs() / v0)
        .fold(0.0, f64::max)
}

/// Analytic gyroradius in the field at distance L perpendicular to the moment.
pub fn theoretical_larmor_radius(
    dipole: &DipoleParameters,
    mass_kg: f64,
    charge_c: f64,
    energy_j: f64,
) -> ShieldResult<f64> {
    let b_l = equatorial_field_magnitude(dipole.protected_size_m, dipole)?;
    if b_l == 0.0 {
        return Ok(f64::INFINITY);
    }
    larmor_radius(mass_kg, charge_c, energy_j, b_l)
}

/// Reduce one trajectory launched at `energy_kev` to its [`EnergyResult`].
pub fn analyze(
    trajectory: &Trajectory,
    dipole: &DipoleParameters,
    mass_kg: f64,
    charge_c: f64,
    energy_kev: f64,
    settings: &DiagnosticSettings,
) -> ShieldResult<EnergyResult> {
    if !energy_kev.is_finite() || energy_kev <= 0.0 {
        return Err(ShieldError::PhysicsViolation(format!(
            "energy_kev must be finite and > 0, got {energy_kev}"
        )));
    }
    let energy_j = kev_to_joules(energy_kev, charge_c);
    let (min_distance_m, closest_approach_time_s) = closest_approach(trajectory);
    let deflection_angle_deg = deflection_angle_deg(trajectory.final_state());
    if !deflection_angle_deg.is_finite() {
        return Err(ShieldError::PhysicsViolation(
            "final velocity produced a non-finite deflection angle".to_string(),
        ));
    }
    let larmor_radius_m = theoretical_larmor_radius(dipole, mass_kg, charge_c, energy_j)?;
    let max_relative_speed_drift = max_relative_speed_drift(trajectory);
    let near_miss = min_distance_m < settings.near_miss_threshold_m;

    if near_miss {
        log::warn!(
            "{energy_kev:.3} keV: near miss, closest approach {min_distance_m:.4e} m < {:.4e} m",
            settings.near_miss_threshold_m
        );
    }
    if max_relative_speed_drift > settings.speed_drift_warning {
        log::warn!(
            "{energy_kev:.3} keV: speed drift {max_relative_speed_drift:.3e} exceeds {:.3e}",
            settings.speed_drift_warning
        );
    }

    Ok(EnergyResult {
        energy_kev,
        deflection_angle_deg,
        min_distance_m,
        closest_approach_time_s,
        larmor_radius_m,
        near_miss,
        max_relative_speed_drift,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shield_types::config::PhysicalConstants;
    use shield_types::constants::{kev_to_joules, M_ELECTRON, Q_ELECTRON};
    use shield_types::state::SolverStats;

    fn dipole(moment: f64) -> DipoleParameters {
        DipoleParameters::new(moment, &PhysicalConstants::default(), 0.1)
    }

    fn synthetic(states: Vec<ParticleState>) -> Trajectory {
        let times = (0..states.len()).map(|i| i as f64 * 1e-9).collect();
        Trajectory::new(times, states, SolverStats::default()).expect("valid trajectory")
    }

    #[test]
    fn test_closest_approach_picks_minimum_sample() {
        let traj = synthetic(vec![
            [-1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            [-0.2, 0.0, 0.1, 1.0, 0.0, 0.0],
            [0.05, 0.0, 0.05, 0.0, 0.0, 1.0],
            [0.3, 0.0, 0.4, 0.0, 0.0, 1.0],
        ]);
        let (r, t) = closest_approach(&traj);
        assert!((r - (0.005_f64).sqrt()).abs() < 1e-15);
        assert_eq!(t, 2e-9);
    }

    #[test]
    fn test_deflection_angle_quadrants() {
        let cases = [
            ([0.0, 0.0, 0.0, 1.0, 0.0, 0.0], 0.0),
            ([0.0, 0.0, 0.0, 0.0, 0.0, 1.0], 90.0),
            ([0.0, 0.0, 0.0, -1.0, 0.0, 0.0], 180.0),
            ([0.0, 0.0, 0.0, 0.0, 0.0, -1.0], -90.0),
            ([0.0, 0.0, 0.0, 1.0, 0.0, 1.0], 45.0),
        ];
        for (state, expected) in cases {
            let got = deflection_angle_deg(&state);
            assert!((got - expected).abs() < 1e-12, "{state:?}: {got} vs {expected}");
        }
    }

    #[test]
    fn test_deflection_angle_ignores_y_velocity() {
        let a = deflection_angle_deg(&[0.0, 0.0, 0.0, 1.0, 0.0, 1.0]);
        let b = deflection_angle_deg(&[0.0, 0.0, 0.0, 1.0, 50.0, 1.0]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_speed_drift_measures_largest_deviation() {
        let traj = synthetic(vec![
            [0.0, 0.0, 1.0, 10.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0, 10.001, 0.0],
            [0.0, 0.0, 1.0, 0.0, 0.0, 9.99],
        ]);
        let drift = max_relative_speed_drift(&traj);
        assert!((drift - 1e-3).abs() < 1e-12, "drift = {drift}");
    }

    #[test]
    fn test_analyze_flags_near_miss() {
        let traj = synthetic(vec![
            [-1.0, 0.0, 0.005, 1.0e7, 0.0, 0.0],
            [0.0, 0.0, 0.005, 1.0e7, 0.0, 0.0],
            [1.0, 0.0, 0.005, 1.0e7, 0.0, 0.0],
        ]);
        let result = analyze(
            &traj,
            &dipole(1.0),
            M_ELECTRON,
            Q_ELECTRON,
            10.0,
            &DiagnosticSettings::default(),
        )
        .expect("analysis");
        assert!(result.near_miss);
        assert!((result.min_distance_m - 0.005).abs() < 1e-15);
        assert_eq!(result.deflection_angle_deg, 0.0);
        assert_eq!(result.energy_kev, 10.0);
        assert_eq!(result.max_relative_speed_drift, 0.0);
    }

    #[test]
    fn test_analyze_clear_pass_is_not_near_miss() {
        let traj = synthetic(vec![
            [-1.0, 0.0, 0.5, 1.0e7, 0.0, 0.0],
            [1.0, 0.0, 0.5, 1.0e7, 0.0, 0.0],
        ]);
        let result = analyze(
            &traj,
            &dipole(1.0),
            M_ELECTRON,
            Q_ELECTRON,
            10.0,
            &DiagnosticSettings::default(),
        )
        .expect("analysis");
        assert!(!result.near_miss);
    }

    #[test]
    fn test_larmor_radius_matches_direct_formula() {
        let d = dipole(1.066);
        let e_j = kev_to_joules(10.0, Q_ELECTRON);
        let r = theoretical_larmor_radius(&d, M_ELECTRON, Q_ELECTRON, e_j).expect("larmor");
        let b_l = d.vacuum_permeability * d.relative_permeability * d.moment_am2
            / (4.0 * std::f64::consts::PI * 0.1_f64.powi(3));
        let direct = (2.0 * M_ELECTRON * e_j).sqrt() / (Q_ELECTRON.abs() * b_l);
        assert!((r - direct).abs() < 1e-12 * direct);
    }

    #[test]
    fn test_analyze_energy_follows_particle_charge() {
        let traj = synthetic(vec![
            [-1.0, 0.0, 0.5, 1.0e7, 0.0, 0.0],
            [1.0, 0.0, 0.5, 1.0e7, 0.0, 0.0],
        ]);
        let settings = DiagnosticSettings::default();
        let single = analyze(&traj, &dipole(1.066), M_ELECTRON, Q_ELECTRON, 100.0, &settings)
            .expect("analysis");
        let double = analyze(
            &traj,
            &dipole(1.066),
            M_ELECTRON,
            2.0 * Q_ELECTRON,
            100.0,
            &settings,
        )
        .expect("analysis");
        assert_eq!(single.energy_kev, 100.0);
        assert_eq!(double.energy_kev, 100.0);
        // r_L ∝ √(m·E)/|q| with E = keV·1e3·|q|.
        let ratio = double.larmor_radius_m / single.larmor_radius_m;
        assert!((ratio - 0.5_f64.sqrt()).abs() < 1e-12, "ratio = {ratio}");
    }

    #[test]
    fn test_zero_moment_larmor_radius_is_infinite() {
        let r = theoretical_larmor_radius(&dipole(0.0), M_ELECTRON, Q_ELECTRON, 1e-15)
            .expect("larmor");
        assert!(r.is_infinite());
    }

    #[test]
    fn test_analyze_rejects_invalid_energy() {
        let traj = synthetic(vec![[-1.0, 0.0, 0.5, 1.0e7, 0.0, 0.0]]);
        for bad in [0.0, -1.0, f64::NAN] {
            let err = analyze(
                &traj,
                &dipole(1.0),
                M_ELECTRON,
                Q_ELECTRON,
                bad,
                &DiagnosticSettings::default(),
            )
            .expect_err("invalid energy must fail");
            match err {
                ShieldError::PhysicsViolation(msg) => assert!(msg.contains("energy_kev")),
                other => panic!("Unexpected error: {other:?}"),
            }
        }
    }
}
