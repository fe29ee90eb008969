//! Per-energy trajectory export as `.npz` archives for external plotting.

use ndarray::arr1;
use ndarray_npy::NpzWriter;
use shield_core::sweep::SweepReport;
use shield_types::error::{ShieldError, ShieldResult};
use std::fs::File;
use std::path::{Path, PathBuf};

fn npz_error<E>(err: E) -> ShieldError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ShieldError::Io(std::io::Error::other(err))
}

/// File name for one energy, e.g. `trajectory_010.000keV.npz`.
pub fn trajectory_file_name(energy_kev: f64) -> String {
    format!("trajectory_{energy_kev:07.3}keV.npz")
}

/// Write one archive per successful energy into `dir`.
///
/// Each archive holds `trajectory` (`n × 7`: t, x, y, z, vx, vy, vz) and
/// `summary` (energy keV, deflection deg, r_min m, r_L m, near-miss 0/1).
pub fn export_trajectories(report: &SweepReport, dir: &Path) -> ShieldResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for run in report.runs() {
        let r = &run.result;
        let path = dir.join(trajectory_file_name(r.energy_kev));
        let mut npz = NpzWriter::new(File::create(&path)?);
        npz.add_array("trajectory", &run.trajectory.to_array())
            .map_err(npz_error)?;
        let summary = arr1(&[
            r.energy_kev,
            r.deflection_angle_deg,
            r.min_distance_m,
            r.larmor_radius_m,
            if r.near_miss { 1.0 } else { 0.0 },
        ]);
        npz.add_array("summary", &summary).map_err(npz_error)?;
        npz.finish().map_err(npz_error)?;
        log::debug!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
