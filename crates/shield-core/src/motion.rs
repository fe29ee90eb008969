// ─────────────────────────────────────────────────────────────────────
// SCPN Dipole Shield — Equations of Motion
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Non-relativistic Lorentz-force motion in the dipole field (no E-field).
//!
//!   dr/dt = v,   dv/dt = (q/m) (v × B(r))

use crate::field::dipole_field;
use shield_math::dopri::OdeSystem;
use shield_math::vec3::{cross, scale};
use shield_types::config::DipoleParameters;
use shield_types::error::{ShieldError, ShieldResult};
use shield_types::state::{position, velocity, ParticleState};

fn derivative_with_ratio(
    state: &ParticleState,
    dipole: &DipoleParameters,
    charge_to_mass: f64,
) -> ShieldResult<ParticleState> {
    let v = velocity(state);
    let b = dipole_field(position(state), dipole)?;
    let a = scale(cross(v, b), charge_to_mass);
    Ok([v[0], v[1], v[2], a[0], a[1], a[2]])
}

/// State derivative `(vx, vy, vz, ax, ay, az)`. `_t` is unused since the
/// field is static.
pub fn lorentz_derivative(
    _t: f64,
    state: &ParticleState,
    dipole: &DipoleParameters,
    mass_kg: f64,
    charge_c: f64,
) -> ShieldResult<ParticleState> {
    derivative_with_ratio(state, dipole, charge_c / mass_kg)
}

/// A charged particle species moving in a fixed dipole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LorentzSystem {
    pub dipole: DipoleParameters,
    pub mass_kg: f64,
    pub charge_c: f64,
}

impl LorentzSystem {
    pub fn new(dipole: DipoleParameters, mass_kg: f64, charge_c: f64) -> ShieldResult<Self> {
        dipole.validate()?;
        if !mass_kg.is_finite() || mass_kg <= 0.0 {
            return Err(ShieldError::ConfigError(format!(
                "mass_kg must be finite and > 0, got {mass_kg}"
            )));
        }
        if !charge_c.is_finite() || charge_c == 0.0 {
            return Err(ShieldError::ConfigError(format!(
                "charge_c must be finite and non-zero, got {charge_c}"
            )));
        }
        Ok(LorentzSystem {
            dipole,
            mass_kg,
            charge_c,
        })
    }

    /// q/m [C/kg].
    pub fn charge_to_mass(&self) -> f64 {
        self.charge_c / self.mass_kg
    }
}

impl OdeSystem<6> for LorentzSystem {
    fn rhs(&self, _t: f64, y: &ParticleState) -> ShieldResult<ParticleState> {
        derivative_with_ratio(y, &self.dipole, self.charge_to_mass())
    }
}
