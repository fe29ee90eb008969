// ─────────────────────────────────────────────────────────────────────
// SCPN Dipole Shield — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::f64::consts::PI;

/// Vacuum permeability (H/m), classical 4π×10⁻⁷ value used by the sweep.
pub const MU0_SI: f64 = 4.0e-7 * PI;

/// Relative permeability of the dipole core material.
pub const MU_R_CORE: f64 = 100.0;

/// Electron rest mass (kg), three significant digits as in the reference scan.
pub const M_ELECTRON: f64 = 9.11e-31;

/// Electron charge (C), signed.
pub const Q_ELECTRON: f64 = -1.602e-19;

/// Electron-volts per keV.
pub const EV_PER_KEV: f64 = 1.0e3;

/// Side length of the protected region (m).
pub const PROTECTED_SIZE_M: f64 = 0.1;

/// Closest-approach distance below which a trajectory is flagged (m).
pub const NEAR_MISS_THRESHOLD_M: f64 = 0.01;

/// Default relative tolerance of the trajectory integrator.
pub const DEFAULT_RTOL: f64 = 1e-8;

/// Default absolute tolerance of the trajectory integrator.
pub const DEFAULT_ATOL: f64 = 1e-10;

/// Convert a kinetic energy in keV to joules for a particle of charge
/// `charge_c`: `E = keV · 1e3 · |q|`.
pub fn kev_to_joules(energy_kev: f64, charge_c: f64) -> f64 {
    energy_kev * EV_PER_KEV * charge_c.abs()
}
