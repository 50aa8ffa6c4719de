//! # Backbone Optimizer
//!
//! Partitions a one-mode network's node set into a "backbone" that
//! approximately reproduces the full network's eigenvalue spectrum and a
//! "redundant" complement, via single-flip simulated annealing.
//!
//! Objective (minimized):
//!
//! ```text
//! objective(partition) = spectral_distance(full, induced(partition))
//!                      + penalty × |backbone|
//! ```
//!
//! where `induced(partition)` keeps backbone ties at their original weights
//! and zeroes every redundant node's incident weights, on the full n × n
//! dimension so the spectra stay comparable.
//!
//! ## Driving the loop
//!
//! `BackboneOptimizer::new()` only sets up state (spec'd preconditions,
//! seeded RNG, initial random split). Each [`BackboneOptimizer::step`] runs
//! exactly one annealing iteration; [`BackboneOptimizer::run`] drives the
//! loop for the whole budget, checking the cancel flag once per iteration.
//! The caller may instead own the loop, polling a [`ProgressHandle`] from
//! another thread; the progress counter and cancel flag are the only fields
//! meant for concurrent reads.

pub mod spectral;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::model::{BackboneResult, Matrix};
use crate::{Error, Result};

pub use spectral::{eigenvalues_symmetric, induced_network, GraphDistance, SpectralL2};

// ============================================================================
// Configuration
// ============================================================================

/// Annealing parameters. All explicit; the seed makes runs reproducible.
#[derive(Debug, Clone, Copy)]
pub struct BackboneSpec {
    /// Size penalty `p ≥ 0` per backbone node.
    pub penalty: f64,
    /// Iteration budget `T`.
    pub iterations: usize,
    /// RNG seed for the initial split and the flip/accept draws.
    pub seed: u64,
}

impl Default for BackboneSpec {
    fn default() -> Self {
        Self { penalty: 3.5, iterations: 10_000, seed: 0 }
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Cloneable monitor handle. Safe to poll from a thread other than the one
/// driving the optimizer; these atomics are the only shared state.
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    current_t: Arc<AtomicUsize>,
    total: usize,
    cancel: Arc<AtomicBool>,
}

impl ProgressHandle {
    pub fn current_t(&self) -> usize {
        self.current_t.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Request cooperative cancellation; takes effect between iterations.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Optimizer
// ============================================================================

/// Simulated-annealing backbone search over a one-mode matrix.
///
/// The matrix is read-only for the whole run; partition state is exclusively
/// owned here. The best partition seen (by objective) is tracked throughout,
/// so a canceled run still freezes a usable result.
pub struct BackboneOptimizer {
    labels: Vec<String>,
    full: Array2<f64>,
    full_spectrum: Vec<f64>,
    metric: Box<dyn GraphDistance + Send>,

    penalty: f64,
    iterations: usize,
    cooling: f64,
    rng: StdRng,

    current: Vec<bool>,
    current_objective: f64,
    current_distance: f64,

    best: Vec<bool>,
    best_objective: f64,
    best_distance: f64,

    /// Best-so-far distance per iteration; non-increasing by construction.
    history: Vec<f64>,

    current_t: Arc<AtomicUsize>,
    cancel: Arc<AtomicBool>,
}

/// Geometric cooling endpoints. The schedule runs `T_START → T_END` over
/// the iteration budget.
const T_START: f64 = 1.0;
const T_END: f64 = 1e-3;

impl BackboneOptimizer {
    /// Set up a run: validate preconditions, seed the RNG, draw the initial
    /// random split, and compute the full spectrum. Does not iterate.
    pub fn new(matrix: &Matrix, spec: BackboneSpec) -> Result<Self> {
        if !matrix.one_mode || !matrix.check_invariants() {
            return Err(Error::BackbonePrecondition(
                "backbone needs a symmetric one-mode matrix with zero diagonal".into(),
            ));
        }
        if !spec.penalty.is_finite() || spec.penalty < 0.0 {
            return Err(Error::InvalidSpec(format!(
                "penalty must be a finite non-negative number, got {}",
                spec.penalty
            )));
        }
        if spec.iterations == 0 {
            return Err(Error::InvalidSpec("iteration budget must be at least 1".into()));
        }

        let n = matrix.row_labels.len();
        let non_isolated = (0..n)
            .filter(|&i| (0..n).any(|j| matrix.weights[[i, j]] != 0.0))
            .count();
        if non_isolated < 2 {
            return Err(Error::BackbonePrecondition(format!(
                "need at least 2 non-isolated nodes, found {non_isolated}"
            )));
        }

        let full = matrix.weights.clone();
        let full_spectrum = eigenvalues_symmetric(&full);
        let metric: Box<dyn GraphDistance + Send> = Box::new(SpectralL2);

        let mut rng = StdRng::seed_from_u64(spec.seed);
        // Random split: deterministic under the seed, and it gives the
        // distance history an actual descent to record.
        let current: Vec<bool> = (0..n).map(|_| rng.gen::<bool>()).collect();

        let current_distance = metric.distance(&full_spectrum, &induced_network(&full, &current));
        let backbone_size = current.iter().filter(|&&b| b).count();
        let current_objective = current_distance + spec.penalty * backbone_size as f64;

        debug!(
            nodes = n,
            iterations = spec.iterations,
            penalty = spec.penalty,
            seed = spec.seed,
            "backbone optimizer initialized"
        );

        Ok(Self {
            labels: matrix.row_labels.clone(),
            full,
            full_spectrum,
            metric,
            penalty: spec.penalty,
            iterations: spec.iterations,
            cooling: (T_END / T_START).powf(1.0 / spec.iterations as f64),
            rng,
            best: current.clone(),
            best_objective: current_objective,
            best_distance: current_distance,
            current,
            current_objective,
            current_distance,
            history: Vec::with_capacity(spec.iterations),
            current_t: Arc::new(AtomicUsize::new(0)),
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Swap in a different network-distance metric before iterating.
    pub fn with_metric(mut self, metric: Box<dyn GraphDistance + Send>) -> Self {
        self.metric = metric;
        self
    }

    /// Monitor handle for a polling thread.
    pub fn progress(&self) -> ProgressHandle {
        ProgressHandle {
            current_t: Arc::clone(&self.current_t),
            total: self.iterations,
            cancel: Arc::clone(&self.cancel),
        }
    }

    /// Iterations completed so far.
    pub fn current_t(&self) -> usize {
        self.current_t.load(Ordering::Relaxed)
    }

    fn temperature(&self, t: usize) -> f64 {
        T_START * self.cooling.powi(t as i32)
    }

    /// One annealing iteration: propose a single uniform flip, evaluate the
    /// penalized objective, Metropolis-accept, record best-so-far. Returns
    /// `false` once the iteration budget is exhausted.
    pub fn step(&mut self) -> bool {
        let t = self.current_t.load(Ordering::Relaxed);
        if t >= self.iterations {
            return false;
        }

        let n = self.current.len();
        let flip = self.rng.gen_range(0..n);
        self.current[flip] = !self.current[flip];

        let candidate_distance = self
            .metric
            .distance(&self.full_spectrum, &induced_network(&self.full, &self.current));
        let backbone_size = self.current.iter().filter(|&&b| b).count();
        let candidate_objective = candidate_distance + self.penalty * backbone_size as f64;

        let delta = candidate_objective - self.current_objective;
        let accept =
            delta <= 0.0 || self.rng.gen::<f64>() < (-delta / self.temperature(t)).exp();

        if accept {
            self.current_objective = candidate_objective;
            self.current_distance = candidate_distance;
        } else {
            self.current[flip] = !self.current[flip];
        }

        if self.current_objective < self.best_objective {
            self.best_objective = self.current_objective;
            self.best_distance = self.current_distance;
            self.best.copy_from_slice(&self.current);
        }

        let best_so_far = self
            .history
            .last()
            .copied()
            .unwrap_or(f64::INFINITY)
            .min(self.current_distance);
        self.history.push(best_so_far);

        self.current_t.store(t + 1, Ordering::Relaxed);
        true
    }

    /// Drive the full budget, checking the cancel flag once per iteration.
    /// A canceled run returns the best-so-far result, not an error.
    pub fn run(mut self) -> BackboneResult {
        while !self.cancel.load(Ordering::Relaxed) && self.step() {}
        let result = self.result();
        info!(
            iterations = result.iterations_run,
            backbone = result.backbone_set.len(),
            redundant = result.redundant_set.len(),
            distance = result.spectral_distance,
            "backbone run finished"
        );
        result
    }

    /// Freeze the best partition seen so far into an immutable result.
    pub fn result(&self) -> BackboneResult {
        let backbone_set = self
            .labels
            .iter()
            .zip(&self.best)
            .filter(|(_, &b)| b)
            .map(|(l, _)| l.clone())
            .collect();
        let redundant_set = self
            .labels
            .iter()
            .zip(&self.best)
            .filter(|(_, &b)| !b)
            .map(|(l, _)| l.clone())
            .collect();
        BackboneResult {
            node_labels: self.labels.clone(),
            backbone_set,
            redundant_set,
            penalty: self.penalty,
            iterations_run: self.current_t(),
            distance_history: self.history.clone(),
            spectral_distance: self.best_distance,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
