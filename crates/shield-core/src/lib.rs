//! Dipole shielding core.
//!
//! Field model and equations of motion, adaptive trajectory integration,
//! per-energy diagnostics and the energy sweep driver.

pub mod diagnostics;
pub mod field;
pub mod motion;
pub mod shielding;
pub mod sweep;
pub mod trajectory;
