//! Typed observation records
//!
//! An [`Observation`] is one individual of the lottery dataset. Records are
//! converted to the columnar input encoding with `serde_arrow`, after which
//! the categorical origin and district attributes are expanded into the
//! binary columns the input file carries.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, FieldRef};
use serde::{Deserialize, Serialize};

use super::columns::{
    ARGENTINE, COHORT, CRIME_RATE, CRIME_TYPES, DISTRICT_COUNT, DRAFT_NUMBER, FORMAL, HIGH_NUMBER,
    INCOME, INDIGENOUS, MALVINAS, NATURALIZED, NAVY, SERVED, UNEMPLOYMENT, district_dummy,
};
use crate::error::Result;
use crate::utils::arrow::with_columns;

/// Origin of an individual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    /// Argentine-born, not indigenous
    Argentine,
    /// Born abroad, naturalized
    Naturalized,
    /// Argentine-born, indigenous
    Indigenous,
}

impl Origin {
    /// Name of the binary column encoding this origin
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Argentine => ARGENTINE,
            Self::Naturalized => NATURALIZED,
            Self::Indigenous => INDIGENOUS,
        }
    }
}

/// One individual of the lottery dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub cohort: Option<i32>,
    pub draftnumber: Option<i32>,
    pub highnumber: Option<f64>,
    pub sm: Option<f64>,
    pub crimerate: Option<f64>,
    pub arms: Option<f64>,
    pub property: Option<f64>,
    pub sexual: Option<f64>,
    pub murder: Option<f64>,
    pub threat: Option<f64>,
    pub drug: Option<f64>,
    pub whitecollar: Option<f64>,
    pub malvinas: Option<f64>,
    pub navy: Option<f64>,
    pub formal: Option<f64>,
    pub unemployment: Option<f64>,
    pub income: Option<f64>,
    /// Expanded into `argentine`/`naturalized`/`indigenous`
    #[serde(skip)]
    pub origin: Option<Origin>,
    /// Expanded into `dist1`..`dist24`
    #[serde(skip)]
    pub district: Option<u8>,
}

impl Observation {
    /// Arrow fields of the scalar attributes, in serialization order
    #[must_use]
    pub fn fields() -> Vec<FieldRef> {
        let mut fields = vec![
            Field::new(COHORT, DataType::Int32, true),
            Field::new(DRAFT_NUMBER, DataType::Int32, true),
            Field::new(HIGH_NUMBER, DataType::Float64, true),
            Field::new(SERVED, DataType::Float64, true),
            Field::new(CRIME_RATE, DataType::Float64, true),
        ];
        fields.extend(
            CRIME_TYPES
                .iter()
                .map(|name| Field::new(*name, DataType::Float64, true)),
        );
        fields.extend(
            [MALVINAS, NAVY, FORMAL, UNEMPLOYMENT, INCOME]
                .iter()
                .map(|name| Field::new(*name, DataType::Float64, true)),
        );
        fields.into_iter().map(Arc::new).collect()
    }
}

/// Convert observations to the input encoding of the lottery dataset
///
/// Origin becomes the three binary columns `argentine`, `naturalized` and
/// `indigenous`; district becomes `dist1`..`dist24`. An unknown origin or
/// district yields nulls in every column of its encoding.
pub fn observations_to_batch(observations: &[Observation]) -> Result<RecordBatch> {
    let fields = Observation::fields();
    let batch = serde_arrow::to_record_batch(&fields, &observations)?;

    let mut encoded: Vec<(String, ArrayRef)> = Vec::with_capacity(3 + DISTRICT_COUNT as usize);
    for origin in [Origin::Argentine, Origin::Naturalized, Origin::Indigenous] {
        let values: Float64Array = observations
            .iter()
            .map(|obs| obs.origin.map(|o| if o == origin { 1.0 } else { 0.0 }))
            .collect();
        encoded.push((origin.column().to_string(), Arc::new(values)));
    }
    for district in 1..=DISTRICT_COUNT {
        let values: Float64Array = observations
            .iter()
            .map(|obs| obs.district.map(|d| if d == district { 1.0 } else { 0.0 }))
            .collect();
        encoded.push((district_dummy(district), Arc::new(values)));
    }

    with_columns(&batch, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::arrow::float_array;
    use arrow::array::Array;

    #[test]
    fn test_observations_to_batch() {
        let observations = vec![
            Observation {
                cohort: Some(1958),
                highnumber: Some(1.0),
                origin: Some(Origin::Indigenous),
                district: Some(3),
                ..Default::default()
            },
            Observation {
                cohort: Some(1959),
                highnumber: Some(0.0),
                ..Default::default()
            },
        ];

        let batch = observations_to_batch(&observations).unwrap();
        assert_eq!(batch.num_rows(), 2);
        // 17 scalar attributes, 3 origin columns, 24 district columns
        assert_eq!(batch.num_columns(), 17 + 3 + 24);

        let indigenous = float_array(&batch, INDIGENOUS).unwrap();
        assert_eq!(indigenous.value(0), 1.0);
        assert!(indigenous.is_null(1));

        let dist3 = float_array(&batch, "dist3").unwrap();
        assert_eq!(dist3.value(0), 1.0);
        let dist1 = float_array(&batch, "dist1").unwrap();
        assert_eq!(dist1.value(0), 0.0);
    }
}
