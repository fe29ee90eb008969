use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShieldError {
    #[error("Dipole field is singular at r = {radius_m:e} m")]
    SingularField { radius_m: f64 },

    #[error("Integrator failed to converge at t = {t:e} s (step {step:e} < floor {min_step:e}): {message}")]
    Convergence {
        t: f64,
        step: f64,
        min_step: f64,
        message: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ShieldResult<T> = Result<T, ShieldError>;
