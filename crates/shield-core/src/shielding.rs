// ─────────────────────────────────────────────────────────────────────
// SCPN Dipole Shield — Shielding Criterion
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Dipole-strength threshold for shielding a region of size L.
//!
//! A particle of momentum p = √(2mE) is turned before reaching L when its
//! gyroradius in the equatorial field B(L) = μ0μr·m_d / (4πL³) does not
//! exceed L, giving
//!
//!   m_d,min = (4πL² / (μ0μr)) · √(2mE) / |q|

use shield_types::error::{ShieldError, ShieldResult};
use shield_types::state::EnergyResult;
use std::f64::consts::PI;

fn check_positive(value: f64, label: &str) -> ShieldResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ShieldError::PhysicsViolation(format!(
            "{label} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

/// Non-relativistic momentum magnitude √(2mE) [kg·m/s].
pub fn momentum(mass_kg: f64, energy_j: f64) -> ShieldResult<f64> {
    check_positive(mass_kg, "mass_kg")?;
    if !energy_j.is_finite() || energy_j < 0.0 {
        return Err(ShieldError::PhysicsViolation(format!(
            "energy_j must be finite and >= 0, got {energy_j}"
        )));
    }
    Ok((2.0 * mass_kg * energy_j).sqrt())
}

/// Minimum dipole moment [A·m²] shielding size `protected_size_m` against
/// particles of `energy_j`.
pub fn minimum_shielding_moment(
    protected_size_m: f64,
    vacuum_permeability: f64,
    relative_permeability: f64,
    mass_kg: f64,
    charge_c: f64,
    energy_j: f64,
) -> ShieldResult<f64> {
    check_positive(protected_size_m, "protected_size_m")?;
    check_positive(vacuum_permeability, "vacuum_permeability")?;
    check_positive(relative_permeability, "relative_permeability")?;
    if !charge_c.is_finite() || charge_c == 0.0 {
        return Err(ShieldError::PhysicsViolation(format!(
            "charge_c must be finite and non-zero, got {charge_c}"
        )));
    }
    let p = momentum(mass_kg, energy_j)?;
    let l2 = protected_size_m * protected_size_m;
    Ok(4.0 * PI * l2 / (vacuum_permeability * relative_permeability) * p / charge_c.abs())
}

/// Gyroradius p / (|q|·B) [m] in a uniform field of magnitude `b_t`.
pub fn larmor_radius(mass_kg: f64, charge_c: f64, energy_j: f64, b_t: f64) -> ShieldResult<f64> {
    check_positive(b_t, "b_t")?;
    if !charge_c.is_finite() || charge_c == 0.0 {
        return Err(ShieldError::PhysicsViolation(format!(
            "charge_c must be finite and non-zero, got {charge_c}"
        )));
    }
    Ok(momentum(mass_kg, energy_j)? / (charge_c.abs() * b_t))
}

/// True when the particle stayed outside the protected region.
pub fn is_shielded(result: &EnergyResult, protected_size_m: f64) -> bool {
    result.min_distance_m >= protected_size_m
}
