use crate::{SpMat, TransitionMatrix, F, NodeId};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Configuration for the iterative committor solve.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolverConfig {
    pub max_iterations: usize,
    pub tolerance: F, // relative residual threshold
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-10,
        }
    }
}

/// Outcome of the iterative solve. A non-converged solve is not fatal: the
/// best available iterate is still returned, and this report is how callers
/// tell the two cases apart.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SolveReport {
    pub converged: bool,
    pub iterations: usize,
    pub residual: F,
}

/// Sink for per-iteration solver diagnostics.
pub trait IterationReporter {
    fn report(&mut self, iteration: usize, residual: F);
}

/// Discards all diagnostics.
pub struct NullReporter;

impl IterationReporter for NullReporter {
    fn report(&mut self, _iteration: usize, _residual: F) {}
}

/// Writes one line per iteration to stderr.
pub struct ConsoleReporter;

impl IterationReporter for ConsoleReporter {
    fn report(&mut self, iteration: usize, residual: F) {
        eprintln!("bicgstab iteration {:>5}: residual {:e}", iteration, residual);
    }
}

/// Forward and backward committor vectors plus the solve report.
#[derive(Clone, Debug)]
pub struct CommittorSolution {
    pub q_forward: DVector<F>,
    pub q_backward: DVector<F>,
    pub report: SolveReport,
}

/// Solves the boundary-value problem for the forward committor.
///
/// For interior states the committor satisfies
/// `q+[i] = Σ_{j∈K} T[i][j] + Σ_{j interior} T[i][j] * q+[j]`,
/// with `q+ = 1` on the target set K and `q+ = 0` on the source set S.
/// The system is assembled as `(I - T)` restricted to interior rows and
/// columns, boundary rows replaced by identity rows, and the boundary
/// columns folded into the right-hand side.
///
/// The matrix is not symmetric in general, so the solve uses BiCGStab with
/// Jacobi (diagonal) preconditioning rather than an SPD-only method.
#[derive(Clone, Debug, Default)]
pub struct CommittorSolver {
    pub config: SolverConfig,
}

impl CommittorSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solves for the forward committor; `q- = 1 - q+` in closed form.
    pub fn solve(
        &self,
        t: &TransitionMatrix,
        sources: &[NodeId],
        targets: &[NodeId],
    ) -> CommittorSolution {
        self.solve_with_reporter(t, sources, targets, &mut NullReporter)
    }

    pub fn solve_with_reporter(
        &self,
        t: &TransitionMatrix,
        sources: &[NodeId],
        targets: &[NodeId],
        reporter: &mut dyn IterationReporter,
    ) -> CommittorSolution {
        let n = t.n();
        let mut is_source = vec![false; n];
        let mut is_target = vec![false; n];
        for &s in sources {
            is_source[s] = true;
        }
        for &k in targets {
            is_target[k] = true;
        }

        let (a, b) = assemble_system(t, &is_source, &is_target);
        let (a, b) = jacobi_scale(a, b);

        let (mut x, report) = bicgstab(&a, &b, &self.config, reporter);

        // Boundary rows are identity rows; pin their entries exactly so the
        // boundary invariants hold bit-for-bit.
        for i in 0..n {
            if is_target[i] {
                x[i] = 1.0;
            } else if is_source[i] {
                x[i] = 0.0;
            }
        }

        let q_backward = DVector::from_fn(n, |i, _| 1.0 - x[i]);

        CommittorSolution {
            q_forward: x,
            q_backward,
            report,
        }
    }
}

/// Builds the boundary-eliminated linear system `A x = b`.
fn assemble_system(
    t: &TransitionMatrix,
    is_source: &[bool],
    is_target: &[bool],
) -> (SpMat, DVector<F>) {
    let n = t.n();
    let mut a = SpMat::zeros(n);
    let mut b = DVector::zeros(n);

    for i in 0..n {
        if is_target[i] {
            a.set(i, i, 1.0);
            b[i] = 1.0;
        } else if is_source[i] {
            a.set(i, i, 1.0);
            // b[i] is already zero
        } else {
            for &(j, p) in t.row(i) {
                if j == i {
                    continue;
                }
                if is_target[j] {
                    // direct mass into the target set
                    b[i] += p;
                } else if !is_source[j] {
                    a.set(i, j, -p);
                }
                // columns into the source set carry q+ = 0 and drop out
            }
            a.set(i, i, 1.0 - t.get(i, i));
        }
    }

    (a, b)
}

/// Left-scales the system by the inverse diagonal (Jacobi preconditioning).
/// Rows with a zero diagonal (absorbing interior states) are left unscaled.
fn jacobi_scale(a: SpMat, b: DVector<F>) -> (SpMat, DVector<F>) {
    let n = a.n();
    let mut rows = Vec::with_capacity(n);
    let mut b_scaled = b;

    for i in 0..n {
        let d = a.get(i, i);
        let inv = if d != 0.0 { 1.0 / d } else { 1.0 };
        rows.push(a.row(i).iter().map(|&(j, v)| (j, v * inv)).collect());
        b_scaled[i] *= inv;
    }

    (SpMat::from_rows(rows), b_scaled)
}

/// Unpreconditioned BiCGStab on the (already scaled) system, starting from
/// the zero vector. Returns the final iterate whether or not the relative
/// residual reached the tolerance; the report says which.
fn bicgstab(
    a: &SpMat,
    b: &DVector<F>,
    config: &SolverConfig,
    reporter: &mut dyn IterationReporter,
) -> (DVector<F>, SolveReport) {
    let n = a.n();
    let mut x = DVector::zeros(n);

    let b_norm = b.norm();
    if b_norm == 0.0 {
        // Zero right-hand side: the zero vector is the exact solution.
        return (
            x,
            SolveReport {
                converged: true,
                iterations: 0,
                residual: 0.0,
            },
        );
    }
    let threshold = config.tolerance * b_norm;

    let mut r = b.clone();
    let r_hat = r.clone();
    let mut residual = r.norm();

    if residual <= threshold {
        return (
            x,
            SolveReport {
                converged: true,
                iterations: 0,
                residual: residual / b_norm,
            },
        );
    }

    let mut rho = 1.0;
    let mut alpha = 1.0;
    let mut omega = 1.0;
    let mut v = DVector::zeros(n);
    let mut p = DVector::zeros(n);

    let mut converged = false;
    let mut iterations = 0;

    for k in 1..=config.max_iterations {
        iterations = k;

        let rho_new = r_hat.dot(&r);
        if rho_new == 0.0 {
            break; // breakdown: restart would be needed, return best iterate
        }

        if k == 1 {
            p = r.clone();
        } else {
            let beta = (rho_new / rho) * (alpha / omega);
            p = &r + (&p - &v * omega) * beta;
        }

        v = a.mul_vec(&p);
        let denom = r_hat.dot(&v);
        if denom == 0.0 {
            break;
        }
        alpha = rho_new / denom;

        let s = &r - &v * alpha;
        residual = s.norm();
        if residual <= threshold {
            x += &p * alpha;
            converged = true;
            reporter.report(k, residual / b_norm);
            break;
        }

        let t = a.mul_vec(&s);
        let tt = t.dot(&t);
        if tt == 0.0 {
            x += &p * alpha;
            break;
        }
        omega = t.dot(&s) / tt;

        x += &p * alpha + &s * omega;
        r = &s - &t * omega;
        rho = rho_new;

        residual = r.norm();
        reporter.report(k, residual / b_norm);

        if residual <= threshold {
            converged = true;
            break;
        }
        if omega == 0.0 {
            break;
        }
    }

    (
        x,
        SolveReport {
            converged,
            iterations,
            residual: residual / b_norm,
        },
    )
}
