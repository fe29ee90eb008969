// ─────────────────────────────────────────────────────────────────────
// SCPN Dipole Shield — Dipole Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Closed-form magnetic field of a point dipole at the origin.
//!
//!   B(r) = (μ0·μr / 4π) · (3(m·r̂)r̂ − m) / |r|³,   m = m_d ẑ
//!
//! The expression is singular at the origin. Points closer than
//! [`SINGULAR_RADIUS_M`] are rejected with `ShieldError::SingularField`;
//! the field is never clamped.

use shield_math::vec3::{dot, is_finite, norm, scale, sub};
use shield_types::config::DipoleParameters;
use shield_types::error::{ShieldError, ShieldResult};
use std::f64::consts::PI;

/// Radius below which the dipole field is treated as undefined [m].
pub const SINGULAR_RADIUS_M: f64 = 1e-12;

/// Unit direction of the dipole moment.
pub const MOMENT_AXIS: [f64; 3] = [0.0, 0.0, 1.0];

/// μ0·μr / 4π [H/m].
fn field_prefactor(dipole: &DipoleParameters) -> f64 {
    dipole.vacuum_permeability * dipole.relative_permeability / (4.0 * PI)
}

/// Magnetic field vector [T] at `position` [m].
pub fn dipole_field(position: [f64; 3], dipole: &DipoleParameters) -> ShieldResult<[f64; 3]> {
    if !is_finite(position) {
        return Err(ShieldError::PhysicsViolation(
            "field evaluation position must be finite".to_string(),
        ));
    }
    let r = norm(position);
    if r < SINGULAR_RADIUS_M {
        return Err(ShieldError::SingularField { radius_m: r });
    }

    let r_hat = scale(position, 1.0 / r);
    let m = scale(MOMENT_AXIS, dipole.moment_am2);
    let m_r = dot(m, r_hat);
    let coeff = field_prefactor(dipole) / (r * r * r);
    Ok(scale(sub(scale(r_hat, 3.0 * m_r), m), coeff))
}

/// |B| [T] at `position`.
pub fn field_magnitude(position: [f64; 3], dipole: &DipoleParameters) -> ShieldResult<f64> {
    Ok(norm(dipole_field(position, dipole)?))
}

/// |B| at `distance` along +x, perpendicular to the moment.
///
/// This is the reference field of the shielding criterion:
/// `μ0·μr·m_d / (4π d³)`.
pub fn equatorial_field_magnitude(distance_m: f64, dipole: &DipoleParameters) -> ShieldResult<f64> {
    if !distance_m.is_finite() || distance_m <= 0.0 {
        return Err(ShieldError::PhysicsViolation(format!(
            "equatorial distance must be finite and > 0, got {distance_m}"
        )));
    }
    field_magnitude([distance_m, 0.0, 0.0], dipole)
}
