// ─────────────────────────────────────────────────────────────────────
// SCPN Dipole Shield — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{
    kev_to_joules, DEFAULT_ATOL, DEFAULT_RTOL, MU0_SI, MU_R_CORE, M_ELECTRON,
    NEAR_MISS_THRESHOLD_M, PROTECTED_SIZE_M, Q_ELECTRON,
};
use crate::error::{ShieldError, ShieldResult};
use serde::{Deserialize, Serialize};

fn check_positive(value: f64, label: &str) -> ShieldResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ShieldError::ConfigError(format!(
            "{label} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

/// Scalar physical constants shared by every energy of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    #[serde(default = "default_mu0")]
    pub vacuum_permeability: f64,
    #[serde(default = "default_mu_r")]
    pub relative_permeability: f64,
    #[serde(default = "default_mass")]
    pub electron_mass_kg: f64,
    /// Signed particle charge [C].
    #[serde(default = "default_charge")]
    pub electron_charge_c: f64,
}

fn default_mu0() -> f64 {
    MU0_SI
}
fn default_mu_r() -> f64 {
    MU_R_CORE
}
fn default_mass() -> f64 {
    M_ELECTRON
}
fn default_charge() -> f64 {
    Q_ELECTRON
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        PhysicalConstants {
            vacuum_permeability: default_mu0(),
            relative_permeability: default_mu_r(),
            electron_mass_kg: default_mass(),
            electron_charge_c: default_charge(),
        }
    }
}

impl PhysicalConstants {
    /// Kinetic energy [J] of `energy_kev` for the configured particle charge.
    pub fn kev_to_joules(&self, energy_kev: f64) -> f64 {
        kev_to_joules(energy_kev, self.electron_charge_c)
    }

    pub fn validate(&self) -> ShieldResult<()> {
        check_positive(self.vacuum_permeability, "vacuum_permeability")?;
        check_positive(self.relative_permeability, "relative_permeability")?;
        check_positive(self.electron_mass_kg, "electron_mass_kg")?;
        if !self.electron_charge_c.is_finite() || self.electron_charge_c == 0.0 {
            return Err(ShieldError::ConfigError(format!(
                "electron_charge_c must be finite and non-zero, got {}",
                self.electron_charge_c
            )));
        }
        Ok(())
    }
}

/// Point dipole at the origin with its moment along +z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DipoleParameters {
    /// Moment magnitude [A·m²].
    pub moment_am2: f64,
    pub vacuum_permeability: f64,
    pub relative_permeability: f64,
    /// Protected-region size L [m]. Not used by the field formula.
    pub protected_size_m: f64,
}

impl DipoleParameters {
    pub fn new(moment_am2: f64, constants: &PhysicalConstants, protected_size_m: f64) -> Self {
        DipoleParameters {
            moment_am2,
            vacuum_permeability: constants.vacuum_permeability,
            relative_permeability: constants.relative_permeability,
            protected_size_m,
        }
    }

    pub fn validate(&self) -> ShieldResult<()> {
        if !self.moment_am2.is_finite() || self.moment_am2 < 0.0 {
            return Err(ShieldError::ConfigError(format!(
                "moment_am2 must be finite and >= 0, got {}",
                self.moment_am2
            )));
        }
        check_positive(self.vacuum_permeability, "vacuum_permeability")?;
        check_positive(self.relative_permeability, "relative_permeability")?;
        check_positive(self.protected_size_m, "protected_size_m")?;
        Ok(())
    }
}

/// Local error tolerances of the adaptive integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    #[serde(default = "default_rtol")]
    pub rtol: f64,
    #[serde(default = "default_atol")]
    pub atol: f64,
}

fn default_rtol() -> f64 {
    DEFAULT_RTOL
}
fn default_atol() -> f64 {
    DEFAULT_ATOL
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            rtol: default_rtol(),
            atol: default_atol(),
        }
    }
}

impl Tolerances {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Tolerances { rtol, atol }
    }

    pub fn validate(&self) -> ShieldResult<()> {
        check_positive(self.rtol, "rtol")?;
        check_positive(self.atol, "atol")?;
        Ok(())
    }
}

/// Step-size controller settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepControl {
    /// Safety factor applied to the optimal step estimate.
    #[serde(default = "default_safety")]
    pub safety: f64,
    /// Smallest allowed shrink factor per step.
    #[serde(default = "default_min_factor")]
    pub min_factor: f64,
    /// Largest allowed growth factor per step.
    #[serde(default = "default_max_factor")]
    pub max_factor: f64,
    /// Upper bound on the step [s]. `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_step: Option<f64>,
    /// First trial step [s]. `None` selects it automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_step: Option<f64>,
    /// Maximum number of accepted steps before giving up.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_safety() -> f64 {
    0.9
}
fn default_min_factor() -> f64 {
    0.2
}
fn default_max_factor() -> f64 {
    5.0
}
fn default_max_steps() -> usize {
    5_000_000
}

impl Default for StepControl {
    fn default() -> Self {
        StepControl {
            safety: default_safety(),
            min_factor: default_min_factor(),
            max_factor: default_max_factor(),
            max_step: None,
            initial_step: None,
            max_steps: default_max_steps(),
        }
    }
}

impl StepControl {
    pub fn validate(&self) -> ShieldResult<()> {
        if !self.safety.is_finite() || self.safety <= 0.0 || self.safety > 1.0 {
            return Err(ShieldError::ConfigError(format!(
                "safety must be in (0, 1], got {}",
                self.safety
            )));
        }
        if !self.min_factor.is_finite() || self.min_factor <= 0.0 || self.min_factor >= 1.0 {
            return Err(ShieldError::ConfigError(format!(
                "min_factor must be in (0, 1), got {}",
                self.min_factor
            )));
        }
        if !self.max_factor.is_finite() || self.max_factor <= 1.0 {
            return Err(ShieldError::ConfigError(format!(
                "max_factor must be finite and > 1, got {}",
                self.max_factor
            )));
        }
        if let Some(h) = self.max_step {
            check_positive(h, "max_step")?;
        }
        if let Some(h) = self.initial_step {
            check_positive(h, "initial_step")?;
        }
        if self.max_steps == 0 {
            return Err(ShieldError::ConfigError(
                "max_steps must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Thresholds used when reducing a trajectory to scalar diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSettings {
    #[serde(default = "default_near_miss")]
    pub near_miss_threshold_m: f64,
    /// Relative speed drift above which a warning is logged.
    #[serde(default = "default_speed_drift_warning")]
    pub speed_drift_warning: f64,
}

fn default_near_miss() -> f64 {
    NEAR_MISS_THRESHOLD_M
}
fn default_speed_drift_warning() -> f64 {
    1e-4
}

impl Default for DiagnosticSettings {
    fn default() -> Self {
        DiagnosticSettings {
            near_miss_threshold_m: default_near_miss(),
            speed_drift_warning: default_speed_drift_warning(),
        }
    }
}

impl DiagnosticSettings {
    pub fn validate(&self) -> ShieldResult<()> {
        check_positive(self.near_miss_threshold_m, "near_miss_threshold_m")?;
        check_positive(self.speed_drift_warning, "speed_drift_warning")?;
        Ok(())
    }
}

/// Launch geometry, expressed in multiples of the protected size L.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchConfig {
    #[serde(default = "default_start_x_factor")]
    pub start_x_factor: f64,
    #[serde(default = "default_start_z_factor")]
    pub start_z_factor: f64,
}

fn default_start_x_factor() -> f64 {
    -10.0
}
fn default_start_z_factor() -> f64 {
    0.1
}

impl Default for LaunchConfig {
    fn default() -> Self {
        LaunchConfig {
            start_x_factor: default_start_x_factor(),
            start_z_factor: default_start_z_factor(),
        }
    }
}

/// What the sweep does when one energy fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and keep sweeping.
    #[default]
    Continue,
    /// Stop at the first failed energy.
    Abort,
}

/// Top-level energy sweep configuration (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default)]
    pub constants: PhysicalConstants,
    #[serde(default = "default_protected_size")]
    pub protected_size_m: f64,
    #[serde(default = "default_energies")]
    pub energies_kev: Vec<f64>,
    /// Energy the dipole must shield. Defaults to the highest swept energy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_energy_kev: Option<f64>,
    /// Explicit moment override [A·m²]; bypasses the shielding criterion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dipole_moment_am2: Option<f64>,
    #[serde(default)]
    pub launch: LaunchConfig,
    #[serde(default = "default_time_span")]
    pub time_span_s: [f64; 2],
    #[serde(default)]
    pub tolerances: Tolerances,
    #[serde(default)]
    pub step_control: StepControl,
    #[serde(default)]
    pub diagnostics: DiagnosticSettings,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

fn default_protected_size() -> f64 {
    PROTECTED_SIZE_M
}
fn default_energies() -> Vec<f64> {
    vec![1.0, 10.0, 30.0, 60.0, 100.0]
}
fn default_time_span() -> [f64; 2] {
    [0.0, 1.0e-7]
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            constants: PhysicalConstants::default(),
            protected_size_m: default_protected_size(),
            energies_kev: default_energies(),
            reference_energy_kev: None,
            dipole_moment_am2: None,
            launch: LaunchConfig::default(),
            time_span_s: default_time_span(),
            tolerances: Tolerances::default(),
            step_control: StepControl::default(),
            diagnostics: DiagnosticSettings::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl SweepConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> ShieldResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ShieldResult<()> {
        self.constants.validate()?;
        check_positive(self.protected_size_m, "protected_size_m")?;
        if self.energies_kev.is_empty() {
            return Err(ShieldError::ConfigError(
                "energies_kev must contain at least one energy".to_string(),
            ));
        }
        for (idx, &e) in self.energies_kev.iter().enumerate() {
            check_positive(e, &format!("energies_kev[{idx}]"))?;
        }
        if let Some(e) = self.reference_energy_kev {
            check_positive(e, "reference_energy_kev")?;
        }
        if let Some(m) = self.dipole_moment_am2 {
            if !m.is_finite() || m < 0.0 {
                return Err(ShieldError::ConfigError(format!(
                    "dipole_moment_am2 must be finite and >= 0, got {m}"
                )));
            }
        }
        if !self.launch.start_x_factor.is_finite() || !self.launch.start_z_factor.is_finite() {
            return Err(ShieldError::ConfigError(
                "launch factors must be finite".to_string(),
            ));
        }
        let [t0, t1] = self.time_span_s;
        if !t0.is_finite() || !t1.is_finite() || t1 <= t0 {
            return Err(ShieldError::ConfigError(format!(
                "time_span_s must be finite with t1 > t0, got [{t0}, {t1}]"
            )));
        }
        self.tolerances.validate()?;
        self.step_control.validate()?;
        self.diagnostics.validate()?;
        Ok(())
    }

    /// Energy the dipole moment is sized for [keV].
    pub fn reference_energy(&self) -> f64 {
        self.reference_energy_kev.unwrap_or_else(|| {
            self.energies_kev
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max)
        })
    }
}
