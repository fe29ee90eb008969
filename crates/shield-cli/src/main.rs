// ─────────────────────────────────────────────────────────────────────
// SCPN Dipole Shield — Sweep CLI
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! `dipole-shield`: run an electron energy sweep against a shielding dipole.
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

mod args;
mod export;
mod report;

use args::{parse_args, CliArgs, USAGE};
use shield_core::sweep::{run_sweep, run_sweep_parallel};
use shield_types::config::SweepConfig;
use shield_types::error::ShieldResult;
use std::process::ExitCode;

fn run(args: &CliArgs) -> ShieldResult<bool> {
    let config = match &args.config_path {
        Some(path) => {
            log::info!("loading sweep config from {path}");
            SweepConfig::from_file(path)?
        }
        None => {
            log::info!("no config given, using the built-in reference sweep");
            SweepConfig::default()
        }
    };

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(true);
    }

    let report = if args.parallel {
        run_sweep_parallel(&config)?
    } else {
        run_sweep(&config)?
    };
    print!("{}", report::format_report(&report));

    if let Some(dir) = &args.export_dir {
        let written = export::export_trajectories(&report, dir)?;
        log::info!("exported {} trajectories to {}", written.len(), dir.display());
    }
    Ok(report.all_succeeded())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::from(2);
        }
    };
    if args.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            log::warn!("sweep finished with failed energies");
            ExitCode::from(1)
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(3)
        }
    }
}
