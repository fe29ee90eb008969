//! Fixed-width text report of a finished sweep.

use shield_core::shielding::is_shielded;
use shield_core::sweep::{EnergyOutcome, SweepReport};

fn format_row(outcome: &EnergyOutcome, protected_size_m: f64) -> String {
    match &outcome.outcome {
        Ok(run) => {
            let r = &run.result;
            format!(
                "{:>10.2} {:>12.2} {:>14.5e} {:>14.5e} {:>10} {:>9}\n",
                r.energy_kev,
                r.deflection_angle_deg,
                r.min_distance_m,
                r.larmor_radius_m,
                if is_shielded(r, protected_size_m) { "yes" } else { "no" },
                if r.near_miss { "NEAR" } else { "-" }
            )
        }
        Err(e) => format!("{:>10.2} FAILED: {e}\n", outcome.energy_kev),
    }
}

pub fn format_report(report: &SweepReport) -> String {
    let l = report.dipole.protected_size_m;
    let mut out = format!(
        "Dipole moment {:.4e} A·m² (μr = {}, L = {} m, sized for {} keV)\n",
        report.dipole.moment_am2,
        report.dipole.relative_permeability,
        l,
        report.reference_energy_kev
    );
    out.push_str(&format!(
        "{:>10} {:>12} {:>14} {:>14} {:>10} {:>9}\n",
        "E [keV]", "angle [deg]", "r_min [m]", "r_L [m]", "shielded", "advisory"
    ));
    for outcome in &report.outcomes {
        out.push_str(&format_row(outcome, l));
    }
    out
}
