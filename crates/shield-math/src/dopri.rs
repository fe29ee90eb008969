// ─────────────────────────────────────────────────────────────────────
// SCPN Dipole Shield — Dormand-Prince Integrator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Adaptive Dormand-Prince 5(4) integration for small fixed-size systems.
//!
//! The 5th-order solution is propagated, the embedded 4th-order solution
//! only feeds the local error estimate. The last stage is reused as the
//! first stage of the next step (FSAL), so an accepted step costs six
//! right-hand-side evaluations and a rejected one six as well.
//!
//! Step control follows Hairer, Nørsett & Wanner (1993), II.4: the new step
//! is `h · safety · err^(-1/5)` clamped to `[min_factor, max_factor]`, with
//! growth suppressed right after a rejection.

use shield_types::config::{StepControl, Tolerances};
use shield_types::error::{ShieldError, ShieldResult};
use shield_types::state::SolverStats;

/// Step floor in units of machine epsilon relative to `max(|t|, span)`.
const MIN_STEP_ULPS: f64 = 10.0;

/// Error exponent `-1/(q+1)` for the embedded 4th-order estimate.
const ERROR_EXPONENT: f64 = -0.2;

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (also the 7th stage row, b2 = b7 = 0).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// b5 - b4: difference between the 5th- and embedded 4th-order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

/// First-order ODE system `dy/dt = f(t, y)` with a fallible right-hand side.
pub trait OdeSystem<const N: usize> {
    fn rhs(&self, t: f64, y: &[f64; N]) -> ShieldResult<[f64; N]>;
}

impl<F, const N: usize> OdeSystem<N> for F
where
    F: Fn(f64, &[f64; N]) -> ShieldResult<[f64; N]>,
{
    fn rhs(&self, t: f64, y: &[f64; N]) -> ShieldResult<[f64; N]> {
        self(t, y)
    }
}

/// Accepted samples of one integration, initial point included.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<const N: usize> {
    pub t: Vec<f64>,
    pub y: Vec<[f64; N]>,
    pub stats: SolverStats,
}

impl<const N: usize> Solution<N> {
    pub fn final_state(&self) -> &[f64; N] {
        &self.y[self.y.len() - 1]
    }
}

/// `y + h * Σ a_i k_i` over the given stage pairs.
fn combine<const N: usize>(y: &[f64; N], h: f64, terms: &[(f64, &[f64; N])]) -> [f64; N] {
    let mut out = *y;
    for (i, slot) in out.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (a, k) in terms {
            acc += a * k[i];
        }
        *slot += h * acc;
    }
    out
}

fn rms_norm<const N: usize>(v: &[f64; N], scale: &[f64; N]) -> f64 {
    if N == 0 {
        return 0.0;
    }
    let sum: f64 = v
        .iter()
        .zip(scale.iter())
        .map(|(x, s)| (x / s) * (x / s))
        .sum();
    (sum / N as f64).sqrt()
}

fn validate_inputs<const N: usize>(
    t_span: (f64, f64),
    y0: &[f64; N],
    tol: &Tolerances,
    control: &StepControl,
) -> ShieldResult<()> {
    let (t0, t1) = t_span;
    if !t0.is_finite() || !t1.is_finite() || t1 <= t0 {
        return Err(ShieldError::ConfigError(format!(
            "integration span must be finite with t1 > t0, got ({t0}, {t1})"
        )));
    }
    if y0.iter().any(|v| !v.is_finite()) {
        return Err(ShieldError::ConfigError(
            "initial state must be finite".to_string(),
        ));
    }
    tol.validate()?;
    control.validate()?;
    Ok(())
}

/// Initial step heuristic of Hairer, Nørsett & Wanner (II.4, p. 169).
fn select_initial_step<S, const N: usize>(
    system: &S,
    t0: f64,
    y0: &[f64; N],
    f0: &[f64; N],
    span: f64,
    tol: &Tolerances,
    stats: &mut SolverStats,
) -> ShieldResult<f64>
where
    S: OdeSystem<N> + ?Sized,
{
    let mut scale = [0.0; N];
    for (s, y) in scale.iter_mut().zip(y0.iter()) {
        *s = tol.atol + tol.rtol * y.abs();
    }
    let d0 = rms_norm(y0, &scale);
    let d1 = rms_norm(f0, &scale);
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6 * span
    } else {
        (0.01 * d0 / d1).min(span)
    };

    let y1 = combine(y0, h0, &[(1.0, f0)]);
    let f1 = system.rhs(t0 + h0, &y1)?;
    stats.rhs_evaluations += 1;

    let mut diff = [0.0; N];
    for (d, (a, b)) in diff.iter_mut().zip(f1.iter().zip(f0.iter())) {
        *d = a - b;
    }
    let d2 = rms_norm(&diff, &scale) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6 * span)
    } else {
        (0.01 / d1.max(d2)).powf(-ERROR_EXPONENT)
    };

    Ok((100.0 * h0).min(h1).min(span))
}

/// Integrate `system` from `t_span.0` to `t_span.1` starting at `y0`.
///
/// Returns every accepted sample. Fails with [`ShieldError::Convergence`]
/// when the step needed to satisfy `tol` drops below the machine-precision
/// floor, or when `control.max_steps` accepted steps do not reach `t_span.1`.
/// Errors raised by the right-hand side abort the integration unchanged.
pub fn integrate_dopri5<S, const N: usize>(
    system: &S,
    t_span: (f64, f64),
    y0: [f64; N],
    tol: &Tolerances,
    control: &StepControl,
) -> ShieldResult<Solution<N>>
where
    S: OdeSystem<N> + ?Sized,
{
    validate_inputs(t_span, &y0, tol, control)?;
    let (t0, t1) = t_span;
    let span = t1 - t0;
    let max_step = control.max_step.unwrap_or(f64::INFINITY).min(span);

    let mut stats = SolverStats::default();
    let mut t = t0;
    let mut y = y0;
    let mut k1 = system.rhs(t, &y)?;
    stats.rhs_evaluations += 1;

    let mut h = match control.initial_step {
        Some(h) => h,
        None => select_initial_step(system, t0, &y0, &k1, span, tol, &mut stats)?,
    }
    .min(max_step);

    let mut times = vec![t0];
    let mut states = vec![y0];
    let mut stats_min_step = f64::INFINITY;
    let mut rejected_last = false;

    while t < t1 {
        let min_step = MIN_STEP_ULPS * f64::EPSILON * t.abs().max(span);
        if !h.is_finite() || h < min_step {
            return Err(ShieldError::Convergence {
                t,
                step: h,
                min_step,
                message: "required step fell below the machine-precision floor".to_string(),
            });
        }
        if stats.accepted_steps >= control.max_steps {
            return Err(ShieldError::Convergence {
                t,
                step: h,
                min_step,
                message: format!(
                    "exceeded {} accepted steps before t = {t1:e}",
                    control.max_steps
                ),
            });
        }

        let last = t + h >= t1 || t1 - (t + h) < min_step;
        if last {
            h = t1 - t;
        }

        let k2 = system.rhs(t + C2 * h, &combine(&y, h, &[(A21, &k1)]))?;
        let k3 = system.rhs(t + C3 * h, &combine(&y, h, &[(A31, &k1), (A32, &k2)]))?;
        let k4 = system.rhs(
            t + C4 * h,
            &combine(&y, h, &[(A41, &k1), (A42, &k2), (A43, &k3)]),
        )?;
        let k5 = system.rhs(
            t + C5 * h,
            &combine(&y, h, &[(A51, &k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
        )?;
        let k6 = system.rhs(
            t + h,
            &combine(
                &y,
                h,
                &[(A61, &k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
            ),
        )?;
        let y_new = combine(
            &y,
            h,
            &[(B1, &k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
        );
        let k7 = system.rhs(t + h, &y_new)?;
        stats.rhs_evaluations += 6;

        let mut err_norm = 0.0_f64;
        for i in 0..N {
            let err_i =
                h * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
            let sc = tol.atol + tol.rtol * y[i].abs().max(y_new[i].abs());
            err_norm = err_norm.max(err_i.abs() / sc);
        }
        if err_norm.is_nan() {
            err_norm = f64::INFINITY;
        }

        if err_norm <= 1.0 {
            if y_new.iter().any(|v| !v.is_finite()) {
                return Err(ShieldError::PhysicsViolation(format!(
                    "integrated state became non-finite at t = {:e}",
                    t + h
                )));
            }
            let t_new = if last { t1 } else { t + h };
            stats.accepted_steps += 1;
            stats_min_step = stats_min_step.min(h);
            stats.max_step = stats.max_step.max(h);

            t = t_new;
            y = y_new;
            k1 = k7;
            times.push(t);
            states.push(y);

            let mut factor = if err_norm == 0.0 {
                control.max_factor
            } else {
                (control.safety * err_norm.powf(ERROR_EXPONENT)).min(control.max_factor)
            };
            if rejected_last {
                factor = factor.min(1.0);
            }
            rejected_last = false;
            h = (h * factor).min(max_step);
        } else {
            stats.rejected_steps += 1;
            let factor = if err_norm.is_finite() {
                (control.safety * err_norm.powf(ERROR_EXPONENT)).max(control.min_factor)
            } else {
                control.min_factor
            };
            rejected_last = true;
            h *= factor;
        }
    }

    stats.min_step = if stats.accepted_steps > 0 {
        stats_min_step
    } else {
        0.0
    };
    log::debug!(
        "dopri5 finished: accepted={}, rejected={}, rhs={}, h_min={:e}, h_max={:e}",
        stats.accepted_steps,
        stats.rejected_steps,
        stats.rhs_evaluations,
        stats.min_step,
        stats.max_step
    );

    Ok(Solution {
        t: times,
        y: states,
        stats,
    })
}
