// ─────────────────────────────────────────────────────────────────────
// SCPN Dipole Shield — Energy Sweep
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Energy sweep orchestration.
//!
//! Every energy is a pure function of the configuration and the shared
//! dipole, so the sequential and the rayon driver return identical,
//! energy-ordered reports. Failed energies are kept as errors; nothing is
//! substituted for them.

use crate::diagnostics::analyze;
use crate::motion::LorentzSystem;
use crate::shielding::minimum_shielding_moment;
use crate::trajectory::{integrate_trajectory, IntegratorSettings};
use rayon::prelude::*;
use shield_types::config::{
    DipoleParameters, FailurePolicy, LaunchConfig, PhysicalConstants, SweepConfig,
};
use shield_types::error::{ShieldError, ShieldResult};
use shield_types::state::{EnergyResult, ParticleState, Trajectory};

/// Trajectory and diagnostics of one successful energy.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyRun {
    pub trajectory: Trajectory,
    pub result: EnergyResult,
}

/// Outcome of one swept energy.
#[derive(Debug)]
pub struct EnergyOutcome {
    pub energy_kev: f64,
    pub outcome: ShieldResult<EnergyRun>,
}

/// Full sweep output, ordered as `SweepConfig::energies_kev`.
#[derive(Debug)]
pub struct SweepReport {
    pub dipole: DipoleParameters,
    pub reference_energy_kev: f64,
    pub outcomes: Vec<EnergyOutcome>,
}

impl SweepReport {
    /// Successful runs in sweep order.
    pub fn runs(&self) -> impl Iterator<Item = &EnergyRun> {
        self.outcomes.iter().filter_map(|o| o.outcome.as_ref().ok())
    }

    pub fn results(&self) -> Vec<EnergyResult> {
        self.runs().map(|run| run.result).collect()
    }

    /// `(energy_kev, error)` of every failed energy.
    pub fn failures(&self) -> Vec<(f64, &ShieldError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.outcome.as_ref().err().map(|e| (o.energy_kev, e)))
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.outcome.is_ok())
    }
}

/// Dipole used for the whole sweep: the explicit override, or the minimum
/// moment that shields `protected_size_m` at the reference energy.
pub fn dipole_for_sweep(config: &SweepConfig) -> ShieldResult<DipoleParameters> {
    config.validate()?;
    let c = &config.constants;
    let moment = match config.dipole_moment_am2 {
        Some(m) => m,
        None => minimum_shielding_moment(
            config.protected_size_m,
            c.vacuum_permeability,
            c.relative_permeability,
            c.electron_mass_kg,
            c.electron_charge_c,
            c.kev_to_joules(config.reference_energy()),
        )?,
    };
    let dipole = DipoleParameters::new(moment, c, config.protected_size_m);
    dipole.validate()?;
    Ok(dipole)
}

/// Launch state `(x0, 0, z0, v0, 0, 0)` with `v0 = √(2E/m)` and
/// `E = keV · 1e3 · |q|` for the configured particle.
pub fn initial_state(
    energy_kev: f64,
    protected_size_m: f64,
    constants: &PhysicalConstants,
    launch: &LaunchConfig,
) -> ShieldResult<ParticleState> {
    if !energy_kev.is_finite() || energy_kev <= 0.0 {
        return Err(ShieldError::ConfigError(format!(
            "energy_kev must be finite and > 0, got {energy_kev}"
        )));
    }
    constants.validate()?;
    let v0 = (2.0 * constants.kev_to_joules(energy_kev) / constants.electron_mass_kg).sqrt();
    Ok([
        launch.start_x_factor * protected_size_m,
        0.0,
        launch.start_z_factor * protected_size_m,
        v0,
        0.0,
        0.0,
    ])
}

/// Integrate and analyse a single energy against a fixed dipole.
pub fn simulate_energy(
    energy_kev: f64,
    config: &SweepConfig,
    dipole: &DipoleParameters,
) -> ShieldResult<EnergyRun> {
    let c = &config.constants;
    let system = LorentzSystem::new(*dipole, c.electron_mass_kg, c.electron_charge_c)?;
    let initial = initial_state(energy_kev, config.protected_size_m, c, &config.launch)?;
    let [t0, t1] = config.time_span_s;
    let settings = IntegratorSettings::from_config(config);

    let trajectory = integrate_trajectory(initial, (t0, t1), &system, &settings)?;
    let result = analyze(
        &trajectory,
        dipole,
        c.electron_mass_kg,
        c.electron_charge_c,
        energy_kev,
        &config.diagnostics,
    )?;

    log::info!(
        "{energy_kev:.3} keV: r_min = {:.4e} m, deflection = {:.2} deg, r_L = {:.4e} m, steps = {} (+{} rejected)",
        result.min_distance_m,
        result.deflection_angle_deg,
        result.larmor_radius_m,
        trajectory.stats().accepted_steps,
        trajectory.stats().rejected_steps,
    );
    Ok(EnergyRun { trajectory, result })
}

fn finish_report(
    config: &SweepConfig,
    dipole: DipoleParameters,
    outcomes: Vec<EnergyOutcome>,
) -> ShieldResult<SweepReport> {
    for o in &outcomes {
        if let Err(e) = &o.outcome {
            log::error!("{:.3} keV failed: {e}", o.energy_kev);
        }
    }
    Ok(SweepReport {
        dipole,
        reference_energy_kev: config.reference_energy(),
        outcomes,
    })
}

/// Sweep all configured energies one after another.
///
/// With [`FailurePolicy::Abort`] the first failure is returned as the error.
pub fn run_sweep(config: &SweepConfig) -> ShieldResult<SweepReport> {
    let dipole = dipole_for_sweep(config)?;
    log::info!(
        "sweeping {} energies, dipole moment {:.4e} A·m² (reference {:.1} keV)",
        config.energies_kev.len(),
        dipole.moment_am2,
        config.reference_energy()
    );

    let mut outcomes = Vec::with_capacity(config.energies_kev.len());
    for &energy_kev in &config.energies_kev {
        match simulate_energy(energy_kev, config, &dipole) {
            Err(e) if config.failure_policy == FailurePolicy::Abort => return Err(e),
            outcome => outcomes.push(EnergyOutcome {
                energy_kev,
                outcome,
            }),
        }
    }
    finish_report(config, dipole, outcomes)
}

/// Sweep all configured energies on the rayon thread pool.
///
/// Produces the same report as [`run_sweep`]. Under
/// [`FailurePolicy::Abort`] every energy is still computed and the
/// first failure in sweep order is returned.
pub fn run_sweep_parallel(config: &SweepConfig) -> ShieldResult<SweepReport> {
    let dipole = dipole_for_sweep(config)?;
    log::info!(
        "sweeping {} energies on {} threads, dipole moment {:.4e} A·m²",
        config.energies_kev.len(),
        rayon::current_num_threads(),
        dipole.moment_am2
    );

    let mut outcomes: Vec<EnergyOutcome> = config
        .energies_kev
        .par_iter()
        .map(|&energy_kev| EnergyOutcome {
            energy_kev,
            outcome: simulate_energy(energy_kev, config, &dipole),
        })
        .collect();

    if config.failure_policy == FailurePolicy::Abort {
        if let Some(idx) = outcomes.iter().position(|o| o.outcome.is_err()) {
            if let Err(e) = outcomes.swap_remove(idx).outcome {
                return Err(e);
            }
        }
    }
    finish_report(config, dipole, outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shield_types::config::StepControl;
    use shield_types::constants::{M_ELECTRON, PROTECTED_SIZE_M};

    #[test]
    fn test_initial_state_matches_reference_launch() {
        let s = initial_state(
            10.0,
            0.1,
            &PhysicalConstants::default(),
            &LaunchConfig::default(),
        )
        .expect("valid launch");
        assert!((s[0] + 1.0).abs() < 1e-15);
        assert_eq!(s[1], 0.0);
        assert!((s[2] - 0.01).abs() < 1e-15);
        let v0 = (2.0 * 10.0 * 1.602e-16 / 9.11e-31_f64).sqrt();
        assert!((s[3] - v0).abs() < 1e-9 * v0);
        assert_eq!((s[4], s[5]), (0.0, 0.0));
    }

    #[test]
    fn test_initial_state_rejects_bad_energy() {
        for bad in [0.0, -5.0, f64::INFINITY] {
            let constants = PhysicalConstants::default();
            assert!(initial_state(bad, 0.1, &constants, &LaunchConfig::default()).is_err());
        }
    }

    #[test]
    fn test_initial_state_uses_configured_charge() {
        let constants = PhysicalConstants {
            electron_charge_c: -3.204e-19,
            ..PhysicalConstants::default()
        };
        let s = initial_state(10.0, 0.1, &constants, &LaunchConfig::default())
            .expect("valid launch");
        let v0 = (2.0 * 10.0 * 3.204e-16 / M_ELECTRON).sqrt();
        assert!((s[3] - v0).abs() < 1e-9 * v0, "v0 = {}, expected {v0}", s[3]);
        assert!((s[3] - 8.387e7).abs() < 1e-3 * 8.387e7);
    }

    #[test]
    fn test_charge_override_flows_through_sweep() {
        let base = SweepConfig {
            energies_kev: vec![10.0],
            ..SweepConfig::default()
        };
        let doubled = SweepConfig {
            constants: PhysicalConstants {
                electron_charge_c: 2.0 * base.constants.electron_charge_c,
                ..base.constants
            },
            ..base.clone()
        };
        // The minimum moment scales as √(m·E)/|q| with E ∝ |q|, i.e. as 1/√2.
        let m_base = dipole_for_sweep(&base).expect("dipole").moment_am2;
        let m_doubled = dipole_for_sweep(&doubled).expect("dipole").moment_am2;
        assert!((m_doubled / m_base - 0.5_f64.sqrt()).abs() < 1e-12);

        let run = simulate_energy(10.0, &doubled, &dipole_for_sweep(&doubled).expect("dipole"))
            .expect("10 keV run");
        assert_eq!(run.result.energy_kev, 10.0);
        let v0 = (2.0 * doubled.constants.kev_to_joules(10.0) / M_ELECTRON).sqrt();
        assert!((run.trajectory.initial_state()[3] - v0).abs() < 1e-9 * v0);
    }

    #[test]
    fn test_dipole_sized_for_highest_energy() {
        let config = SweepConfig {
            energies_kev: vec![10.0, 100.0, 50.0],
            ..SweepConfig::default()
        };
        let dipole = dipole_for_sweep(&config).expect("dipole");
        assert!((dipole.moment_am2 - 1.066).abs() < 1e-3);
        assert_eq!(dipole.protected_size_m, PROTECTED_SIZE_M);
    }

    #[test]
    fn test_dipole_override_bypasses_criterion() {
        let config = SweepConfig {
            dipole_moment_am2: Some(0.25),
            ..SweepConfig::default()
        };
        let dipole = dipole_for_sweep(&config).expect("dipole");
        assert_eq!(dipole.moment_am2, 0.25);
    }

    #[test]
    fn test_continue_policy_keeps_failed_energy() {
        // A one-step budget cannot cover the span, so every energy fails.
        let config = SweepConfig {
            energies_kev: vec![5.0, 20.0],
            step_control: StepControl {
                max_steps: 1,
                ..StepControl::default()
            },
            ..SweepConfig::default()
        };
        let report = run_sweep(&config).expect("continue policy returns a report");
        assert_eq!(report.outcomes.len(), 2);
        assert!(!report.all_succeeded());
        assert_eq!(report.failures().len(), 2);
        assert!(report.results().is_empty());
        for (_, err) in report.failures() {
            assert!(matches!(err, ShieldError::Convergence { .. }));
        }
    }

    #[test]
    fn test_abort_policy_returns_first_failure() {
        let config = SweepConfig {
            energies_kev: vec![5.0, 20.0],
            failure_policy: FailurePolicy::Abort,
            step_control: StepControl {
                max_steps: 1,
                ..StepControl::default()
            },
            ..SweepConfig::default()
        };
        let err = run_sweep(&config).expect_err("abort policy must fail");
        assert!(matches!(err, ShieldError::Convergence { .. }));
        let err = run_sweep_parallel(&config).expect_err("abort policy must fail");
        assert!(matches!(err, ShieldError::Convergence { .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected_before_integration() {
        let config = SweepConfig {
            energies_kev: vec![],
            ..SweepConfig::default()
        };
        assert!(matches!(run_sweep(&config), Err(ShieldError::ConfigError(_))));
    }
}
