//! Hold-out evaluation: deterministic splits, per-class metrics and a
//! confusion matrix, both printable as plain-text tables.

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{Result, SentimentError};
use crate::pipeline::SentimentPipeline;

/// Default fraction of rows held out for testing.
pub const DEFAULT_TEST_FRACTION: f64 = 0.5;

/// Default shuffling seed.
pub const DEFAULT_SEED: u64 = 42;

/// Row indices of a train/test split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(n * test_fraction)` rows.
///
/// With `stratify`, each class is split separately so the test set keeps the
/// class proportions (each class contributes `round(count * test_fraction)`
/// rows). Every class keeps at least one training row, so a singleton class
/// is never held out entirely.
pub fn train_test_split(
    n: usize,
    test_fraction: f64,
    seed: u64,
    stratify: Option<&[usize]>,
) -> Result<Split> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(SentimentError::input(format!(
            "test fraction must be in [0, 1), got {test_fraction}"
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);

    let (mut train, mut test) = match stratify {
        None => {
            let mut indices: Vec<usize> = (0..n).collect();
            indices.shuffle(&mut rng);
            let n_test = (n as f64 * test_fraction).ceil() as usize;
            let train = indices.split_off(n_test);
            (train, indices)
        }
        Some(labels) => {
            if labels.len() != n {
                return Err(SentimentError::LengthMismatch {
                    expected: n,
                    actual: labels.len(),
                });
            }
            let n_classes = labels.iter().copied().max().map_or(0, |m| m + 1);
            let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
            for (index, &label) in labels.iter().enumerate() {
                by_class[label].push(index);
            }

            let (mut train, mut test) = (Vec::new(), Vec::new());
            for mut members in by_class {
                members.shuffle(&mut rng);
                let n_test = (members.len() as f64 * test_fraction).round() as usize;
                let rest = members.split_off(n_test.min(members.len().saturating_sub(1)));
                test.extend(members);
                train.extend(rest);
            }
            train.shuffle(&mut rng);
            test.shuffle(&mut rng);
            (train, test)
        }
    };

    if train.is_empty() {
        return Err(SentimentError::input(format!(
            "test fraction {test_fraction} leaves no training rows out of {n}"
        )));
    }
    train.shrink_to_fit();
    test.shrink_to_fit();
    Ok(Split { train, test })
}

/// Precision, recall and F1 of one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged precision, recall and F1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Per-class metrics plus accuracy and averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AveragedMetrics,
    pub weighted_avg: AveragedMetrics,
    pub support: usize,
}

impl ClassificationReport {
    /// Compute the report for class indices into `classes`.
    ///
    /// Ratios with a zero denominator are reported as 0.
    pub fn compute(y_true: &[usize], y_pred: &[usize], classes: &[String]) -> Result<Self> {
        let matrix = ConfusionMatrix::compute(y_true, y_pred, classes)?;
        Ok(Self::from_matrix(&matrix))
    }

    /// Derive the report from an existing confusion matrix.
    pub fn from_matrix(matrix: &ConfusionMatrix) -> Self {
        let k = matrix.labels.len();
        let total = matrix.total();

        let mut per_class = Vec::with_capacity(k);
        for (c, label) in matrix.labels.iter().enumerate() {
            let tp = matrix.counts[c][c];
            let support: usize = matrix.counts[c].iter().sum();
            let predicted: usize = (0..k).map(|t| matrix.counts[t][c]).sum();

            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            per_class.push(ClassMetrics {
                label: label.clone(),
                precision,
                recall,
                f1,
                support,
            });
        }

        let correct: usize = (0..k).map(|c| matrix.counts[c][c]).sum();
        let macro_avg = average(&per_class, |_| 1.0);
        let weighted_avg = average(&per_class, |m| m.support as f64);

        ClassificationReport {
            classes: per_class,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
            support: total,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn average<F: Fn(&ClassMetrics) -> f64>(metrics: &[ClassMetrics], weight: F) -> AveragedMetrics {
    let total: f64 = metrics.iter().map(&weight).sum();
    if total == 0.0 {
        return AveragedMetrics {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
        };
    }
    let mean = |field: fn(&ClassMetrics) -> f64| {
        metrics.iter().map(|m| weight(m) * field(m)).sum::<f64>() / total
    };
    AveragedMetrics {
        precision: mean(|m| m.precision),
        recall: mean(|m| m.recall),
        f1: mean(|m| m.f1),
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|m| m.label.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "{:>width$}  {:>9}  {:>9}  {:>9}  {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for m in &self.classes {
            writeln!(
                f,
                "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9}  {:>9}  {:>9.2}  {:>9}",
            "accuracy", "", "", self.accuracy, self.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
                name, avg.precision, avg.recall, avg.f1, self.support
            )?;
        }
        Ok(())
    }
}

/// Counts of (true class, predicted class) pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    /// `counts[true][predicted]`.
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn compute(y_true: &[usize], y_pred: &[usize], classes: &[String]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(SentimentError::LengthMismatch {
                expected: y_true.len(),
                actual: y_pred.len(),
            });
        }
        let k = classes.len();
        let mut counts = vec![vec![0; k]; k];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            for index in [t, p] {
                if index >= k {
                    return Err(SentimentError::IndexOutOfRange { index, len: k });
                }
            }
            counts[t][p] += 1;
        }
        Ok(ConfusionMatrix {
            labels: classes.to_vec(),
            counts,
        })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Count of rows with true class `actual` predicted as `predicted`.
    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.counts
            .get(actual)
            .and_then(|row| row.get(predicted))
            .copied()
            .unwrap_or(0)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let max_count = self.counts.iter().flatten().copied().max().unwrap_or(0);
        let cell = self
            .labels
            .iter()
            .map(|l| l.len())
            .chain(std::iter::once(max_count.to_string().len()))
            .max()
            .unwrap_or(1);
        let head = self
            .labels
            .iter()
            .map(|l| l.len())
            .chain(std::iter::once("true \\ pred".len()))
            .max()
            .unwrap_or(0);

        write!(f, "{:<head$}", "true \\ pred")?;
        for label in &self.labels {
            write!(f, "  {label:>cell$}")?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "{label:<head$}")?;
            for count in row {
                write!(f, "  {count:>cell$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A report and confusion matrix for one labeled dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub report: ClassificationReport,
    pub confusion_matrix: ConfusionMatrix,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Classification report:")?;
        write!(f, "{}", self.report)?;
        writeln!(f)?;
        writeln!(f, "Confusion matrix:")?;
        write!(f, "{}", self.confusion_matrix)
    }
}

/// Predict every row of `dataset` and score the predictions.
///
/// Labels the pipeline was not trained on are an error.
pub fn evaluate(pipeline: &SentimentPipeline, dataset: &Dataset) -> Result<Evaluation> {
    let (_, _, encoder) = pipeline.parts()?;
    let y_true = encoder.encode_all(dataset.labels())?;
    let predicted = pipeline.predict_batch(dataset.texts())?;
    let y_pred = encoder.encode_all(&predicted)?;

    let confusion_matrix = ConfusionMatrix::compute(&y_true, &y_pred, encoder.classes())?;
    let report = ClassificationReport::from_matrix(&confusion_matrix);
    log::info!(
        "Evaluated {} rows: accuracy {:.4}",
        dataset.len(),
        report.accuracy
    );
    Ok(Evaluation {
        report,
        confusion_matrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<String> {
        vec!["negative".into(), "neutral".into(), "positive".into()]
    }

    #[test]
    fn test_split_sizes_and_determinism() {
        let split = train_test_split(11, 0.5, DEFAULT_SEED, None).unwrap();
        assert_eq!(split.test.len(), 6);
        assert_eq!(split.train.len(), 5);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort();
        assert_eq!(all, (0..11).collect::<Vec<_>>());

        assert_eq!(split, train_test_split(11, 0.5, DEFAULT_SEED, None).unwrap());
    }

    #[test]
    fn test_split_without_test_rows() {
        let split = train_test_split(4, 0.0, 1, None).unwrap();
        assert!(split.test.is_empty());
        assert_eq!(split.train.len(), 4);
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        assert!(train_test_split(4, 1.0, 1, None).is_err());
        assert!(train_test_split(4, -0.1, 1, None).is_err());
        assert!(train_test_split(1, 0.9, 1, None).is_err());
    }

    #[test]
    fn test_stratified_split_keeps_proportions() {
        let labels: Vec<usize> = (0..20).map(|i| if i < 16 { 0 } else { 1 }).collect();
        let split = train_test_split(20, 0.25, 7, Some(labels.as_slice())).unwrap();

        assert_eq!(split.test.len(), 5);
        assert_eq!(split.test.iter().filter(|&&i| labels[i] == 1).count(), 1);
        assert_eq!(split.train.iter().filter(|&&i| labels[i] == 1).count(), 3);

        assert!(train_test_split(3, 0.5, 7, Some(&[0usize, 1][..])).is_err());
    }

    #[test]
    fn test_stratified_split_keeps_singleton_class_in_train() {
        let labels = [0usize, 0, 0, 0, 1];
        let split = train_test_split(5, 0.5, DEFAULT_SEED, Some(&labels[..])).unwrap();

        assert!(split.train.contains(&4));
        assert!(!split.test.contains(&4));
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len() + split.test.len(), 5);
    }

    #[test]
    fn test_report_metrics() {
        let y_true = [0, 0, 1, 1, 2, 2];
        let y_pred = [0, 1, 1, 1, 2, 0];
        let report = ClassificationReport::compute(&y_true, &y_pred, &classes()).unwrap();

        assert!((report.accuracy - 4.0 / 6.0).abs() < 1e-12);
        let neg = &report.classes[0];
        assert_eq!(neg.support, 2);
        assert!((neg.precision - 0.5).abs() < 1e-12);
        assert!((neg.recall - 0.5).abs() < 1e-12);

        let neutral = &report.classes[1];
        assert!((neutral.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(neutral.recall, 1.0);
        assert!((neutral.f1 - 0.8).abs() < 1e-12);

        let pos = &report.classes[2];
        assert_eq!(pos.precision, 1.0);
        assert!((pos.recall - 0.5).abs() < 1e-12);

        // Equal supports make both averages the same.
        assert!((report.macro_avg.f1 - report.weighted_avg.f1).abs() < 1e-12);
    }

    #[test]
    fn test_absent_class_reports_zero() {
        let report = ClassificationReport::compute(&[0, 0], &[0, 0], &classes()).unwrap();
        assert_eq!(report.classes[2].precision, 0.0);
        assert_eq!(report.classes[2].support, 0);
        assert_eq!(report.weighted_avg.f1, 1.0);
        assert!((report.macro_avg.f1 - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_confusion_matrix() {
        let matrix = ConfusionMatrix::compute(&[0, 1, 2, 2], &[0, 2, 2, 1], &classes()).unwrap();
        assert_eq!(matrix.get(1, 2), 1);
        assert_eq!(matrix.get(2, 2), 1);
        assert_eq!(matrix.get(5, 5), 0);
        assert_eq!(matrix.total(), 4);

        let text = matrix.to_string();
        assert!(text.starts_with("true \\ pred"));
        assert_eq!(text.lines().count(), 4);

        assert!(ConfusionMatrix::compute(&[0], &[3], &classes()).is_err());
        assert!(ConfusionMatrix::compute(&[0], &[], &classes()).is_err());
    }

    #[test]
    fn test_report_display() {
        let report = ClassificationReport::compute(&[0, 1, 2], &[0, 1, 2], &classes()).unwrap();
        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("accuracy"));
        assert!(text.contains("1.00"));
    }
}
