//! Numerical primitives for SCPN Dipole Shield.

pub mod dopri;
pub mod vec3;
