//! Raw property records aligned to a trained feature schema
//!
//! A property entered by hand (size, rooms, year built, location) is turned
//! into a single feature row laid out exactly like the columns a model was
//! trained on. The location becomes a one-hot `Location_<Name>` column.

use crate::error::{HousingError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const SIZE_COLUMN: &str = "Size_sqft";
pub const BEDROOMS_COLUMN: &str = "Bedrooms";
pub const BATHROOMS_COLUMN: &str = "Bathrooms";
pub const YEAR_BUILT_COLUMN: &str = "YearBuilt";
pub const LOCATION_PREFIX: &str = "Location_";

/// Property attributes as a user would enter them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProperty {
    #[serde(rename = "Size_sqft")]
    pub size_sqft: f64,
    #[serde(rename = "Bedrooms")]
    pub bedrooms: f64,
    #[serde(rename = "Bathrooms")]
    pub bathrooms: f64,
    #[serde(rename = "YearBuilt")]
    pub year_built: f64,
    #[serde(rename = "Location")]
    pub location: String,
}

impl RawProperty {
    /// Location with its first letter upper-cased, e.g. `suburb` -> `Suburb`
    pub fn normalized_location(&self) -> String {
        let trimmed = self.location.trim();
        let mut chars = trimmed.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Build a 1 x n feature row for `raw` following `feature_names`.
///
/// Known numeric fields fill their columns, the matching location column is
/// set to 1.0 and every other column is 0.0.
///
/// The model must have been trained on the full set of `Location_*` dummies.
/// With a drop-first encoding the baseline location has no column of its own
/// and is rejected as unknown.
pub fn prepare_features_from_raw(raw: &RawProperty, feature_names: &[String]) -> Result<Array2<f64>> {
    if feature_names.is_empty() {
        return Err(HousingError::InvalidInput(
            "model does not record its feature names".to_string(),
        ));
    }

    let location = raw.normalized_location();
    if location.is_empty() {
        return Err(HousingError::InvalidInput("location is required".to_string()));
    }
    let location_column = format!("{}{}", LOCATION_PREFIX, location);

    let numeric = [
        (SIZE_COLUMN, raw.size_sqft),
        (BEDROOMS_COLUMN, raw.bedrooms),
        (BATHROOMS_COLUMN, raw.bathrooms),
        (YEAR_BUILT_COLUMN, raw.year_built),
    ];
    if let Some((name, _)) = numeric.iter().find(|(_, v)| !v.is_finite()) {
        return Err(HousingError::InvalidInput(format!("{} must be a finite number", name)));
    }

    let mut row = Array2::<f64>::zeros((1, feature_names.len()));
    let mut location_found = false;

    for (idx, name) in feature_names.iter().enumerate() {
        if let Some((_, value)) = numeric.iter().find(|(col, _)| *col == name.as_str()) {
            row[[0, idx]] = *value;
        } else if *name == location_column {
            row[[0, idx]] = 1.0;
            location_found = true;
        } else if !name.starts_with(LOCATION_PREFIX) {
            debug!(column = %name, "No raw field for feature column, using 0.0");
        }
    }

    let has_location_columns = feature_names.iter().any(|n| n.starts_with(LOCATION_PREFIX));
    if has_location_columns && !location_found {
        let known: Vec<&str> = feature_names
            .iter()
            .filter_map(|n| n.strip_prefix(LOCATION_PREFIX))
            .collect();
        return Err(HousingError::InvalidInput(format!(
            "unknown location '{}', expected one of: {}",
            location,
            known.join(", ")
        )));
    }

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    fn property(location: &str) -> RawProperty {
        RawProperty {
            size_sqft: 2575.0,
            bedrooms: 3.0,
            bathrooms: 1.0,
            year_built: 1975.0,
            location: location.to_string(),
        }
    }

    #[test]
    fn test_aligns_to_feature_order() {
        let cols = names(&[
            "YearBuilt",
            "Location_City",
            "Size_sqft",
            "Location_Suburb",
            "Bedrooms",
            "Bathrooms",
            "Location_Rural",
        ]);

        let row = prepare_features_from_raw(&property("suburb"), &cols).unwrap();

        assert_eq!(row.shape(), &[1, 7]);
        assert_eq!(row.row(0).to_vec(), vec![1975.0, 0.0, 2575.0, 1.0, 3.0, 1.0, 0.0]);
    }

    #[test]
    fn test_unknown_columns_default_to_zero() {
        let cols = names(&["Size_sqft", "Garage"]);
        let row = prepare_features_from_raw(&property("City"), &cols).unwrap();
        assert_eq!(row.row(0).to_vec(), vec![2575.0, 0.0]);
    }

    #[test]
    fn test_unknown_location() {
        let cols = names(&["Size_sqft", "Location_City", "Location_Rural"]);
        let err = prepare_features_from_raw(&property("downtown"), &cols).unwrap_err();

        assert!(matches!(err, HousingError::InvalidInput(ref m) if m.contains("Downtown")));
    }

    #[test]
    fn test_drop_first_encoding_rejects_baseline_location() {
        let cols = names(&["Size_sqft", "Location_Rural", "Location_Suburb"]);

        let err = prepare_features_from_raw(&property("City"), &cols).unwrap_err();
        assert!(matches!(err, HousingError::InvalidInput(ref m) if m.contains("Rural, Suburb")));

        let row = prepare_features_from_raw(&property("rural"), &cols).unwrap();
        assert_eq!(row.row(0).to_vec(), vec![2575.0, 1.0, 0.0]);
    }

    #[test]
    fn test_empty_location() {
        let cols = names(&["Size_sqft"]);
        assert!(prepare_features_from_raw(&property("  "), &cols).is_err());
    }

    #[test]
    fn test_deserialize_from_form_payload() {
        let json = r#"{"Size_sqft": 1800, "Bedrooms": 3, "Bathrooms": 2, "YearBuilt": 1990, "Location": "Rural"}"#;
        let raw: RawProperty = serde_json::from_str(json).unwrap();

        assert_eq!(raw.size_sqft, 1800.0);
        assert_eq!(raw.normalized_location(), "Rural");
    }
}
