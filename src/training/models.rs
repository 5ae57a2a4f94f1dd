//! Regressor trait, input validation and evaluation metrics

use crate::error::{HousingError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Regression metrics computed on a held-out partition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Coefficient of determination
    pub r2: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Mean squared error
    pub mse: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl RegressionMetrics {
    /// Compute R², MAE, MSE and RMSE.
    ///
    /// A constant `y_true` has no variance to explain; R² is then 1.0 for an
    /// exact prediction and 0.0 otherwise, so R² never exceeds 1.
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(HousingError::ShapeError {
                expected: format!("y_pred length = {}", y_true.len()),
                actual: format!("y_pred length = {}", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(HousingError::InvalidInput(
                "cannot compute metrics on an empty partition".to_string(),
            ));
        }

        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        let mse = ss_res / n;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        let y_mean = y_true.sum() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();

        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        Ok(Self {
            r2,
            mae,
            mse,
            rmse: mse.sqrt(),
            n_samples: y_true.len(),
        })
    }
}

/// Capability shared by every trainable model in the pipeline
pub trait Regressor: Send + Sync {
    /// Human-readable model name used in reports
    fn name(&self) -> &'static str;

    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Whether `fit` has completed
    fn is_fitted(&self) -> bool;

    /// Training column names (empty when unknown)
    fn feature_names(&self) -> &[String] {
        &[]
    }
}

/// Validate a training pair: matching lengths, enough rows, finite values
pub(crate) fn check_fit_input(x: &Array2<f64>, y: &Array1<f64>, min_samples: usize) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(HousingError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.ncols() == 0 {
        return Err(HousingError::InvalidInput("feature matrix has no columns".to_string()));
    }
    if x.nrows() < min_samples.max(1) {
        return Err(HousingError::InvalidInput(format!(
            "need at least {} samples, got {}",
            min_samples.max(1),
            x.nrows()
        )));
    }
    if let Some(((row, col), _)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(HousingError::DataError(format!(
            "non-finite feature value at row {}, column {}",
            row, col
        )));
    }
    if let Some((row, _)) = y.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(HousingError::DataError(format!("non-finite target value at row {}", row)));
    }
    Ok(())
}

/// Validate a prediction matrix against the fitted width
pub(crate) fn check_predict_input(x: &Array2<f64>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(HousingError::ShapeError {
            expected: format!("{} features", n_features),
            actual: format!("{} features", x.ncols()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_regression_metrics() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.1, 2.0, 2.9, 4.1, 5.0];

        let metrics = RegressionMetrics::compute(&y_true, &y_pred).unwrap();

        assert!((metrics.mse - 0.006).abs() < 1e-12);
        assert!((metrics.mae - 0.06).abs() < 1e-12);
        assert!((metrics.rmse - metrics.mse.sqrt()).abs() < 1e-15);
        assert!(metrics.r2 > 0.99 && metrics.r2 <= 1.0);
        assert_eq!(metrics.n_samples, 5);
    }

    #[test]
    fn test_r2_can_be_negative_but_not_above_one() {
        let y_true = array![1.0, 2.0, 3.0];
        let y_pred = array![3.0, 2.0, 1.0];

        let metrics = RegressionMetrics::compute(&y_true, &y_pred).unwrap();
        assert!((metrics.r2 - (-3.0)).abs() < 1e-12);
        assert!(metrics.mse >= 0.0);
    }

    #[test]
    fn test_constant_target() {
        let y_true = array![5.0, 5.0, 5.0];

        let exact = RegressionMetrics::compute(&y_true, &array![5.0, 5.0, 5.0]).unwrap();
        assert_eq!(exact.r2, 1.0);

        let off = RegressionMetrics::compute(&y_true, &array![4.0, 5.0, 6.0]).unwrap();
        assert_eq!(off.r2, 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        let err = RegressionMetrics::compute(&array![1.0, 2.0], &array![1.0]).unwrap_err();
        assert!(matches!(err, HousingError::ShapeError { .. }));
    }

    #[test]
    fn test_empty_input() {
        let empty = Array1::<f64>::zeros(0);
        let err = RegressionMetrics::compute(&empty, &empty).unwrap_err();
        assert!(matches!(err, HousingError::InvalidInput(_)));
    }
}
