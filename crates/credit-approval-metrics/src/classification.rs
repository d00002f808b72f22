use credit_approval_core::{Float, PipelineError, PipelineResult, Tensor};
use std::fmt;

fn check_lengths<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> PipelineResult<usize> {
    if y_true.numel() != y_pred.numel() {
        return Err(PipelineError::ShapeMismatch {
            expected: y_true.shape_vec(),
            got: y_pred.shape_vec(),
        });
    }
    if y_true.numel() == 0 {
        return Err(PipelineError::InvalidOperation("no samples to score".into()));
    }
    Ok(y_true.numel())
}

fn class_of<T: Float>(v: T) -> usize {
    v.to_f64().round().max(0.0) as usize
}

/// Compute accuracy: fraction of correct predictions.
pub fn accuracy<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> PipelineResult<f64> {
    let n = check_lengths(y_true, y_pred)?;
    let correct = y_true
        .data()
        .iter()
        .zip(y_pred.data())
        .filter(|(&a, &b)| class_of(a) == class_of(b))
        .count();
    Ok(correct as f64 / n as f64)
}

/// Square tally of outcomes: `matrix[true][predicted]`, classes in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub matrix: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn n_classes(&self) -> usize {
        self.matrix.len()
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Correct predictions (the diagonal).
    pub fn correct(&self) -> usize {
        (0..self.n_classes()).map(|c| self.matrix[c][c]).sum()
    }

    pub fn true_positives(&self, class: usize) -> usize {
        self.matrix[class][class]
    }

    pub fn false_positives(&self, class: usize) -> usize {
        (0..self.n_classes())
            .filter(|&t| t != class)
            .map(|t| self.matrix[t][class])
            .sum()
    }

    pub fn false_negatives(&self, class: usize) -> usize {
        (0..self.n_classes())
            .filter(|&p| p != class)
            .map(|p| self.matrix[class][p])
            .sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .matrix
            .iter()
            .flatten()
            .map(|v| v.to_string().len())
            .max()
            .unwrap_or(1);
        for (i, row) in self.matrix.iter().enumerate() {
            let cells: Vec<String> = row.iter().map(|v| format!("{:>w$}", v, w = width)).collect();
            let open = if i == 0 { "[[" } else { " [" };
            let close = if i + 1 == self.matrix.len() { "]]" } else { "]" };
            writeln!(f, "{}{}{}", open, cells.join(" "), close)?;
        }
        Ok(())
    }
}

/// Compute the confusion matrix for `n_classes` integer-coded classes.
/// Rows are the true class, columns the predicted class.
pub fn confusion_matrix<T: Float>(
    y_true: &Tensor<T>,
    y_pred: &Tensor<T>,
    n_classes: usize,
) -> PipelineResult<ConfusionMatrix> {
    check_lengths(y_true, y_pred)?;
    let mut matrix = vec![vec![0usize; n_classes]; n_classes];
    for (&t, &p) in y_true.data().iter().zip(y_pred.data()) {
        let (ti, pi) = (class_of(t), class_of(p));
        if ti >= n_classes || pi >= n_classes {
            return Err(PipelineError::IndexOutOfBounds {
                index: ti.max(pi),
                axis: 0,
                size: n_classes,
            });
        }
        matrix[ti][pi] += 1;
    }
    Ok(ConfusionMatrix { matrix })
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Accuracy plus precision/recall/F1 of one class, derived from a confusion matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub class: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
}

impl ClassificationReport {
    pub fn from_confusion(confusion: ConfusionMatrix, class: usize) -> PipelineResult<Self> {
        if class >= confusion.n_classes() {
            return Err(PipelineError::IndexOutOfBounds {
                index: class,
                axis: 0,
                size: confusion.n_classes(),
            });
        }
        let tp = confusion.true_positives(class);
        let precision = ratio(tp, tp + confusion.false_positives(class));
        let recall = ratio(tp, tp + confusion.false_negatives(class));
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Ok(ClassificationReport {
            class,
            accuracy: ratio(confusion.correct(), confusion.total()),
            precision,
            recall,
            f1,
            confusion,
        })
    }
}

/// Binary classification report for `class`.
pub fn classification_report<T: Float>(
    y_true: &Tensor<T>,
    y_pred: &Tensor<T>,
    class: usize,
) -> PipelineResult<ClassificationReport> {
    ClassificationReport::from_confusion(confusion_matrix(y_true, y_pred, 2)?, class)
}
