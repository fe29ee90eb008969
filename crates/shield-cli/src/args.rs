//! Minimal argument parsing: `dipole-shield [CONFIG] [--parallel] [--export DIR] [--dump-config]`.

use shield_types::error::{ShieldError, ShieldResult};
use std::path::PathBuf;

pub const USAGE: &str =
    "usage: dipole-shield [CONFIG.json] [--parallel] [--export DIR] [--dump-config]";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliArgs {
    pub config_path: Option<String>,
    pub parallel: bool,
    pub export_dir: Option<PathBuf>,
    pub dump_config: bool,
    pub help: bool,
}

pub fn parse_args<I>(args: I) -> ShieldResult<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut out = CliArgs::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--parallel" => out.parallel = true,
            "--dump-config" => out.dump_config = true,
            "-h" | "--help" => out.help = true,
            "--export" => {
                let dir = iter.next().ok_or_else(|| {
                    ShieldError::ConfigError("--export requires a directory".to_string())
                })?;
                out.export_dir = Some(PathBuf::from(dir));
            }
            flag if flag.starts_with("--") => {
                return Err(ShieldError::ConfigError(format!(
                    "unknown option {flag}; {USAGE}"
                )));
            }
            path => {
                if out.config_path.is_some() {
                    return Err(ShieldError::ConfigError(format!(
                        "only one config file may be given; {USAGE}"
                    )));
                }
                out.config_path = Some(path.to_string());
            }
        }
    }
    Ok(out)
}
