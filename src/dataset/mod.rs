//! Feature/target extraction and train/test partitioning

use crate::error::{HousingError, Result};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Numeric feature matrix together with its column names
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    /// Row-major feature values
    pub data: Array2<f64>,
    /// Column names, one per matrix column
    pub names: Vec<String>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }
}

/// Aligned train/test partitions plus the original row index of every partition row
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

impl TrainTestSplit {
    pub fn train_size(&self) -> usize {
        self.train_indices.len()
    }

    pub fn test_size(&self) -> usize {
        self.test_indices.len()
    }
}

/// Split a frame into features (every column not in `excluded`) and the `target` column.
///
/// Every excluded column and the target must be present, so a frame that lost
/// `LogPrice` upstream is rejected here rather than leaking it into the features.
pub fn split_features_target(
    df: &DataFrame,
    target: &str,
    excluded: &[String],
) -> Result<(FeatureMatrix, Array1<f64>)> {
    let present: Vec<&str> = df.get_column_names().into_iter().map(|s| s.as_str()).collect();

    for name in excluded.iter().map(String::as_str).chain(std::iter::once(target)) {
        if !present.contains(&name) {
            return Err(HousingError::ColumnNotFound(name.to_string()));
        }
    }

    let feature_cols: Vec<String> = present
        .iter()
        .filter(|&&name| name != target && !excluded.iter().any(|e| e == name))
        .map(|s| s.to_string())
        .collect();

    if feature_cols.is_empty() {
        return Err(HousingError::InvalidInput(
            "dataset has no feature columns left after excluding target columns".to_string(),
        ));
    }

    let y = Array1::from_vec(column_to_f64(df, target)?);
    let data = columns_to_array2(df, &feature_cols)?;

    Ok((FeatureMatrix { data, names: feature_cols }, y))
}

/// Extract named columns into a row-major `Array2<f64>`
pub fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|name| column_to_f64(df, name))
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_refs[c][r]))
}

/// Cast one column to `f64`, rejecting nulls and values that do not parse as numbers
fn column_to_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| HousingError::ColumnNotFound(name.to_string()))?;

    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| HousingError::DataError(format!("column '{}': {}", name, e)))?;
    let values = casted
        .f64()
        .map_err(|e| HousingError::DataError(format!("column '{}': {}", name, e)))?;

    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                HousingError::DataError(format!(
                    "column '{}' has a missing or non-numeric value at row {}",
                    name, row
                ))
            })
        })
        .collect()
}

/// Shuffle rows with a seeded RNG and hold out `ceil(test_size * n)` of them for testing
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    let n_samples = x.nrows();

    if n_samples != y.len() {
        return Err(HousingError::ShapeError {
            expected: format!("y length = {}", n_samples),
            actual: format!("y length = {}", y.len()),
        });
    }

    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(HousingError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }

    let n_test = (test_size * n_samples as f64).ceil() as usize;
    let n_train = n_samples.saturating_sub(n_test);

    if n_test == 0 || n_train == 0 {
        return Err(HousingError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: format!("leaves an empty partition for {} rows", n_samples),
        });
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_indices = indices[..n_test].to_vec();
    let train_indices = indices[n_test..].to_vec();

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), &train_indices),
        x_test: x.select(Axis(0), &test_indices),
        y_train: y.select(Axis(0), &train_indices),
        y_test: y.select(Axis(0), &test_indices),
        train_indices,
        test_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn excluded() -> Vec<String> {
        vec!["Price".to_string(), "LogPrice".to_string()]
    }

    fn sample_df() -> DataFrame {
        df!(
            "Size_sqft" => &[1200.0, 1800.0, 2400.0, 900.0],
            "Bedrooms" => &[2i64, 3, 4, 1],
            "Price" => &[250000.0, 340000.0, 455000.0, 180000.0],
            "LogPrice" => &[12.43, 12.74, 13.03, 12.10]
        )
        .unwrap()
    }

    fn sequential(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 2), |(r, c)| (r * 10 + c) as f64);
        let y = Array1::from_shape_fn(n, |r| r as f64 * 1000.0);
        (x, y)
    }

    #[test]
    fn test_split_features_target() {
        let df = sample_df();
        let (x, y) = split_features_target(&df, "Price", &excluded()).unwrap();

        assert_eq!(x.names, vec!["Size_sqft", "Bedrooms"]);
        assert_eq!(x.data.shape(), &[4, 2]);
        assert_eq!(x.data[[2, 1]], 4.0);
        assert_eq!(y[1], 340000.0);
    }

    #[test]
    fn test_missing_log_price_column() {
        let df = sample_df().drop("LogPrice").unwrap();
        let err = split_features_target(&df, "Price", &excluded()).unwrap_err();

        assert!(matches!(err, HousingError::ColumnNotFound(ref c) if c == "LogPrice"));
    }

    #[test]
    fn test_missing_price_column() {
        let df = sample_df().drop("Price").unwrap();
        let err = split_features_target(&df, "Price", &excluded()).unwrap_err();

        assert!(matches!(err, HousingError::ColumnNotFound(ref c) if c == "Price"));
    }

    #[test]
    fn test_non_numeric_feature_rejected() {
        let df = df!(
            "Location" => &["City", "Rural"],
            "Price" => &[1.0, 2.0],
            "LogPrice" => &[0.0, 0.69]
        )
        .unwrap();

        let err = split_features_target(&df, "Price", &excluded()).unwrap_err();
        assert!(matches!(err, HousingError::DataError(_)));
    }

    #[test]
    fn test_split_sizes() {
        let (x, y) = sequential(100);
        let split = train_test_split(&x, &y, 0.2, 42).unwrap();

        assert_eq!(split.test_size(), 20);
        assert_eq!(split.train_size(), 80);
        assert_eq!(split.x_test.nrows(), 20);
        assert_eq!(split.y_train.len(), 80);
    }

    #[test]
    fn test_split_rounds_test_partition_up() {
        let (x, y) = sequential(11);
        let split = train_test_split(&x, &y, 0.2, 42).unwrap();

        assert_eq!(split.test_size(), 3);
        assert_eq!(split.train_size() + split.test_size(), 11);
    }

    #[test]
    fn test_split_is_deterministic() {
        let (x, y) = sequential(50);
        let a = train_test_split(&x, &y, 0.2, 42).unwrap();
        let b = train_test_split(&x, &y, 0.2, 42).unwrap();

        assert_eq!(a.test_indices, b.test_indices);
        assert_eq!(a.train_indices, b.train_indices);
        assert_eq!(a.x_test, b.x_test);
    }

    #[test]
    fn test_split_rows_stay_aligned_and_disjoint() {
        let (x, y) = sequential(40);
        let split = train_test_split(&x, &y, 0.2, 7).unwrap();

        for (i, &orig) in split.test_indices.iter().enumerate() {
            assert_eq!(split.y_test[i], y[orig]);
            assert_eq!(split.x_test.row(i), x.row(orig));
        }

        let train: HashSet<usize> = split.train_indices.iter().copied().collect();
        assert!(split.test_indices.iter().all(|i| !train.contains(i)));
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        let (x, y) = sequential(10);
        assert!(train_test_split(&x, &y, 0.0, 42).is_err());
        assert!(train_test_split(&x, &y, 1.0, 42).is_err());
    }

    #[test]
    fn test_split_rejects_length_mismatch() {
        let (x, _) = sequential(10);
        let y = Array1::zeros(9);
        let err = train_test_split(&x, &y, 0.2, 42).unwrap_err();
        assert!(matches!(err, HousingError::ShapeError { .. }));
    }
}
