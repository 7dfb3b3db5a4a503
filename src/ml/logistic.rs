//! Multinomial logistic regression.
//!
//! The model scores class `k` as `w_k · x + b_k` and turns the scores into
//! probabilities with a softmax. Training minimizes the sample-weighted mean
//! cross-entropy plus an L2 penalty on the weights (the intercepts are not
//! penalized):
//!
//! ```text
//! f(W, b) = (1/S) Σ_i s_i · CE(softmax(W x_i + b), y_i) + ‖W‖² / (2 · C · S)
//! ```
//!
//! with `S = Σ_i s_i`. Scaling the usual `C · Σ CE + ‖W‖²/2` objective by
//! `1/(C · S)` leaves the minimizer unchanged and keeps gradient magnitudes
//! independent of the corpus size, so one tolerance fits every dataset.
//!
//! The optimizer is L-BFGS with a backtracking (Armijo) line search. Gradient
//! accumulation is sequential, so two fits on the same data produce
//! bit-identical weights.
//!
//! # Examples
//!
//! ```
//! use tweet_sentiment::ml::logistic::{ClassifierConfig, LogisticRegression};
//! use tweet_sentiment::ml::sparse::SparseVector;
//!
//! let x = vec![
//!     SparseVector::from_dense(&[1.0, 0.0]).unwrap(),
//!     SparseVector::from_dense(&[0.0, 1.0]).unwrap(),
//! ];
//! let y = vec![0, 1];
//!
//! let mut model = LogisticRegression::new(ClassifierConfig::default());
//! let summary = model.fit(&x, &y, 2).unwrap();
//!
//! assert!(summary.convergence_warning().is_none());
//! assert_eq!(model.predict(&x[0]).unwrap(), 0);
//! assert_eq!(model.predict(&x[1]).unwrap(), 1);
//! ```

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentimentError};
use crate::ml::sparse::SparseVector;

/// Armijo sufficient-decrease constant.
const ARMIJO_C1: f64 = 1e-4;

/// Maximum number of step halvings per line search.
const MAX_LINE_SEARCH_STEPS: usize = 60;

/// How training samples are weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    /// Every sample weighs `n / (K · count(class))`, so every class carries
    /// the same total weight.
    Balanced,
    /// Every sample weighs 1.
    Uniform,
}

/// Classifier hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Inverse regularization strength.
    pub c: f64,

    /// Iteration cap for the optimizer.
    pub max_iter: usize,

    /// Stop when the largest absolute gradient component drops to this.
    pub tol: f64,

    pub class_weight: ClassWeight,

    /// Number of correction pairs L-BFGS remembers.
    pub history: usize,

    pub fit_intercept: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-4,
            class_weight: ClassWeight::Balanced,
            history: 10,
            fit_intercept: true,
        }
    }
}

impl ClassifierConfig {
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn with_history(mut self, history: usize) -> Self {
        self.history = history;
        self
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Reject settings the optimizer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(SentimentError::input(format!("C must be positive, got {}", self.c)));
        }
        if self.max_iter == 0 {
            return Err(SentimentError::input("max_iter must be at least 1"));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(SentimentError::input(format!("tol must be positive, got {}", self.tol)));
        }
        if self.history == 0 {
            return Err(SentimentError::input("history must be at least 1"));
        }
        Ok(())
    }
}

/// The optimizer hit its iteration cap before the gradient was small enough.
///
/// This is not an error: the weights reached so far are kept and usable.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceWarning {
    pub max_iter: usize,
    pub gradient_norm: f64,
    pub tol: f64,
}

impl fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "optimizer stopped after {} iterations with gradient norm {:.3e} > tol {:.1e}; \
             increase max_iter for a tighter fit",
            self.max_iter, self.gradient_norm, self.tol
        )
    }
}

/// Outcome of a [`LogisticRegression::fit`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub n_iter: usize,
    pub converged: bool,
    /// Objective value at the returned weights.
    pub final_loss: f64,
    /// Largest absolute gradient component at the returned weights.
    pub gradient_norm: f64,
    pub max_iter: usize,
    pub tol: f64,
}

impl FitSummary {
    /// `Some` when the optimizer stopped without converging.
    pub fn convergence_warning(&self) -> Option<ConvergenceWarning> {
        if self.converged {
            None
        } else {
            Some(ConvergenceWarning {
                max_iter: self.max_iter,
                gradient_norm: self.gradient_norm,
                tol: self.tol,
            })
        }
    }
}

/// Multinomial logistic regression over sparse features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    config: ClassifierConfig,
    n_features: usize,
    n_classes: usize,
    /// Row-major `n_classes × n_features` weights.
    weights: Vec<f64>,
    intercepts: Vec<f64>,
}

impl LogisticRegression {
    /// Create an unfitted model.
    pub fn new(config: ClassifierConfig) -> Self {
        LogisticRegression {
            config,
            n_features: 0,
            n_classes: 0,
            weights: Vec::new(),
            intercepts: Vec::new(),
        }
    }

    /// Fit the model. Labels are class indices in `[0, n_classes)`.
    pub fn fit(
        &mut self,
        features: &[SparseVector],
        labels: &[usize],
        n_classes: usize,
    ) -> Result<FitSummary> {
        self.config.validate()?;
        let n_features = validate_training_data(features, labels, n_classes)?;
        let sample_weights = sample_weights(labels, n_classes, self.config.class_weight);

        log::info!(
            "Training logistic regression: {} samples, {} features, {} classes",
            features.len(),
            n_features,
            n_classes
        );

        let objective = Objective {
            features,
            labels,
            total_weight: sample_weights.iter().sum(),
            sample_weights,
            n_features,
            n_classes,
            c: self.config.c,
            fit_intercept: self.config.fit_intercept,
        };

        let mut theta = vec![0.0; n_classes * n_features + n_classes];
        let summary = minimize_lbfgs(&objective, &mut theta, &self.config);

        let intercepts = theta.split_off(n_classes * n_features);
        self.weights = theta;
        self.intercepts = intercepts;
        self.n_features = n_features;
        self.n_classes = n_classes;

        match summary.convergence_warning() {
            Some(warning) => log::warn!("{warning}"),
            None => log::info!(
                "Converged after {} iterations (loss {:.6})",
                summary.n_iter,
                summary.final_loss
            ),
        }

        Ok(summary)
    }

    /// Decision function: one score per class.
    pub fn predict_scores(&self, x: &SparseVector) -> Result<Vec<f64>> {
        self.check_input(x)?;
        Ok(self.scores_unchecked(x))
    }

    /// Class probabilities (softmax of the scores).
    pub fn predict_proba(&self, x: &SparseVector) -> Result<Vec<f64>> {
        let mut scores = self.predict_scores(x)?;
        softmax_in_place(&mut scores);
        Ok(scores)
    }

    /// The highest-scoring class; ties go to the lowest index.
    pub fn predict(&self, x: &SparseVector) -> Result<usize> {
        Ok(argmax(&self.predict_scores(x)?))
    }

    /// Whether the model has been fitted or loaded.
    pub fn is_fitted(&self) -> bool {
        self.n_classes > 0
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Weights of class `class`, one per feature.
    pub fn coefficients(&self, class: usize) -> Option<&[f64]> {
        if class >= self.n_classes {
            return None;
        }
        let start = class * self.n_features;
        Some(&self.weights[start..start + self.n_features])
    }

    pub fn intercepts(&self) -> &[f64] {
        &self.intercepts
    }

    /// The `k` features with the largest weight for `class`, strongest first.
    pub fn top_features(&self, class: usize, k: usize) -> Vec<(usize, f64)> {
        let Some(row) = self.coefficients(class) else {
            return Vec::new();
        };
        let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(k);
        ranked
    }

    /// Check internal consistency of a deserialized model.
    pub fn validate(&self) -> Result<()> {
        if !self.is_fitted() {
            return Err(SentimentError::NotFitted("classifier"));
        }
        if self.weights.len() != self.n_classes * self.n_features {
            return Err(SentimentError::shape(format!(
                "{} weights for {} classes x {} features",
                self.weights.len(),
                self.n_classes,
                self.n_features
            )));
        }
        if self.intercepts.len() != self.n_classes {
            return Err(SentimentError::shape(format!(
                "{} intercepts for {} classes",
                self.intercepts.len(),
                self.n_classes
            )));
        }
        if self
            .weights
            .iter()
            .chain(self.intercepts.iter())
            .any(|w| !w.is_finite())
        {
            return Err(SentimentError::shape("model contains non-finite weights"));
        }
        Ok(())
    }

    fn check_input(&self, x: &SparseVector) -> Result<()> {
        if !self.is_fitted() {
            return Err(SentimentError::NotFitted("classifier"));
        }
        if x.dim() != self.n_features {
            return Err(SentimentError::shape(format!(
                "classifier expects {} features, got a vector of dimension {}",
                self.n_features,
                x.dim()
            )));
        }
        x.check_finite()
    }

    fn scores_unchecked(&self, x: &SparseVector) -> Vec<f64> {
        let mut scores = self.intercepts.clone();
        for (j, value) in x.iter() {
            for (k, score) in scores.iter_mut().enumerate() {
                *score += self.weights[k * self.n_features + j] * value;
            }
        }
        scores
    }
}

/// Check shapes and values; returns the common feature dimension.
fn validate_training_data(
    features: &[SparseVector],
    labels: &[usize],
    n_classes: usize,
) -> Result<usize> {
    if features.len() != labels.len() {
        return Err(SentimentError::LengthMismatch {
            expected: features.len(),
            actual: labels.len(),
        });
    }
    let Some(first) = features.first() else {
        return Err(SentimentError::input("cannot fit a classifier on zero samples"));
    };
    let n_features = first.dim();
    if n_features == 0 {
        return Err(SentimentError::input("feature vectors have dimension 0"));
    }
    if let Some((i, x)) = features
        .iter()
        .enumerate()
        .find(|(_, x)| x.dim() != n_features)
    {
        return Err(SentimentError::input(format!(
            "sample {i} has dimension {} but sample 0 has {n_features}",
            x.dim()
        )));
    }
    for x in features {
        x.check_finite()?;
    }
    if let Some(&label) = labels.iter().find(|&&label| label >= n_classes) {
        return Err(SentimentError::input(format!(
            "label index {label} out of range for {n_classes} classes"
        )));
    }
    let mut present = vec![false; n_classes];
    for &label in labels {
        present[label] = true;
    }
    if present.iter().filter(|&&p| p).count() < 2 {
        return Err(SentimentError::input(
            "training data must contain at least two distinct classes",
        ));
    }
    Ok(n_features)
}

/// Per-sample weights for the requested class weighting.
fn sample_weights(labels: &[usize], n_classes: usize, class_weight: ClassWeight) -> Vec<f64> {
    match class_weight {
        ClassWeight::Uniform => vec![1.0; labels.len()],
        ClassWeight::Balanced => {
            let mut counts = vec![0usize; n_classes];
            for &label in labels {
                counts[label] += 1;
            }
            let present = counts.iter().filter(|&&c| c > 0).count() as f64;
            let n = labels.len() as f64;
            labels
                .iter()
                .map(|&label| n / (present * counts[label] as f64))
                .collect()
        }
    }
}

/// Regularized, sample-weighted cross-entropy and its gradient.
struct Objective<'a> {
    features: &'a [SparseVector],
    labels: &'a [usize],
    sample_weights: Vec<f64>,
    total_weight: f64,
    n_features: usize,
    n_classes: usize,
    c: f64,
    fit_intercept: bool,
}

impl Objective<'_> {
    /// Loss at `theta`; the gradient is written into `grad`.
    fn evaluate(&self, theta: &[f64], grad: &mut [f64]) -> f64 {
        let (k_classes, d) = (self.n_classes, self.n_features);
        let (weights, intercepts) = theta.split_at(k_classes * d);
        let (grad_w, grad_b) = grad.split_at_mut(k_classes * d);

        let reg = 1.0 / (self.c * self.total_weight);
        let mut loss = 0.5 * reg * weights.iter().map(|w| w * w).sum::<f64>();
        for (g, w) in grad_w.iter_mut().zip(weights) {
            *g = reg * w;
        }
        grad_b.fill(0.0);

        let mut scores = vec![0.0; k_classes];
        for ((x, &y), &s) in self
            .features
            .iter()
            .zip(self.labels)
            .zip(&self.sample_weights)
        {
            scores.copy_from_slice(intercepts);
            for (j, value) in x.iter() {
                for (k, score) in scores.iter_mut().enumerate() {
                    *score += weights[k * d + j] * value;
                }
            }

            let log_norm = log_sum_exp(&scores);
            let scale = s / self.total_weight;
            loss += scale * (log_norm - scores[y]);

            for (k, score) in scores.iter().enumerate() {
                let p = (score - log_norm).exp();
                let residual = scale * (p - if k == y { 1.0 } else { 0.0 });
                if self.fit_intercept {
                    grad_b[k] += residual;
                }
                for (j, value) in x.iter() {
                    grad_w[k * d + j] += residual * value;
                }
            }
        }

        loss
    }
}

/// Minimize `objective` starting from `theta`, in place.
fn minimize_lbfgs(objective: &Objective<'_>, theta: &mut [f64], config: &ClassifierConfig) -> FitSummary {
    let n = theta.len();
    let mut grad = vec![0.0; n];
    let mut loss = objective.evaluate(theta, &mut grad);

    let mut history: VecDeque<(Vec<f64>, Vec<f64>, f64)> = VecDeque::with_capacity(config.history);
    let mut trial = vec![0.0; n];
    let mut trial_grad = vec![0.0; n];
    let mut n_iter = 0;
    let mut converged = max_abs(&grad) <= config.tol;

    while !converged && n_iter < config.max_iter {
        n_iter += 1;

        let mut direction = two_loop_direction(&grad, &history);
        let mut slope = dot(&direction, &grad);
        if slope >= 0.0 {
            history.clear();
            direction = grad.iter().map(|g| -g).collect();
            slope = -dot(&grad, &grad);
        }

        let mut step = if history.is_empty() {
            (1.0 / l2(&grad)).min(1.0)
        } else {
            1.0
        };

        let mut accepted = false;
        for _ in 0..MAX_LINE_SEARCH_STEPS {
            for ((t, &x), &d) in trial.iter_mut().zip(theta.iter()).zip(&direction) {
                *t = x + step * d;
            }
            let trial_loss = objective.evaluate(&trial, &mut trial_grad);
            if trial_loss.is_finite() && trial_loss <= loss + ARMIJO_C1 * step * slope {
                let s: Vec<f64> = trial.iter().zip(theta.iter()).map(|(a, b)| a - b).collect();
                let y: Vec<f64> = trial_grad.iter().zip(&grad).map(|(a, b)| a - b).collect();
                let sy = dot(&s, &y);
                if sy > 1e-10 {
                    if history.len() == config.history {
                        history.pop_front();
                    }
                    history.push_back((s, y, 1.0 / sy));
                }

                theta.copy_from_slice(&trial);
                grad.copy_from_slice(&trial_grad);
                loss = trial_loss;
                accepted = true;
                break;
            }
            step *= 0.5;
        }

        converged = max_abs(&grad) <= config.tol;

        if n_iter % 100 == 0 {
            log::debug!(
                "iteration {n_iter}: loss {loss:.6}, max |grad| {:.3e}",
                max_abs(&grad)
            );
        }

        if !accepted {
            log::debug!("line search made no progress at iteration {n_iter}; stopping");
            break;
        }
    }

    FitSummary {
        n_iter,
        converged,
        final_loss: loss,
        gradient_norm: max_abs(&grad),
        max_iter: config.max_iter,
        tol: config.tol,
    }
}

/// L-BFGS two-loop recursion: approximate `-H⁻¹ g`.
fn two_loop_direction(grad: &[f64], history: &VecDeque<(Vec<f64>, Vec<f64>, f64)>) -> Vec<f64> {
    let mut q = grad.to_vec();
    let mut alphas = vec![0.0; history.len()];

    for (i, (s, y, rho)) in history.iter().enumerate().rev() {
        let alpha = rho * dot(s, &q);
        alphas[i] = alpha;
        axpy(-alpha, y, &mut q);
    }

    if let Some((s, y, _)) = history.back() {
        let gamma = dot(s, y) / dot(y, y);
        q.iter_mut().for_each(|v| *v *= gamma);
    }

    for (i, (s, y, rho)) in history.iter().enumerate() {
        let beta = rho * dot(y, &q);
        axpy(alphas[i] - beta, s, &mut q);
    }

    q.iter_mut().for_each(|v| *v = -*v);
    q
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

fn l2(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}

fn log_sum_exp(scores: &[f64]) -> f64 {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    max + scores.iter().map(|s| (s - max).exp()).sum::<f64>().ln()
}

fn softmax_in_place(scores: &mut [f64]) {
    let log_norm = log_sum_exp(scores);
    for score in scores.iter_mut() {
        *score = (*score - log_norm).exp();
    }
}

/// Index of the largest value; the first one wins ties.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}
