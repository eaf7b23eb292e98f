use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::datatypes::DataType;
use draft_lottery::utils::arrow::float_array;
use draft_lottery::{Error, read_dataset, read_dataset_async, write_parquet};

use crate::utils::{raw_dataset, scratch_dir, test_config};

#[test]
fn test_directory_round_trip() -> draft_lottery::Result<()> {
    let dir = scratch_dir("round_trip");
    let data = raw_dataset(50);
    let half = data.num_rows() / 2;

    // Two files, read back in path order
    write_parquet(&dir.join("part_0.parquet"), &data.slice(0, half))?;
    write_parquet(&dir.join("part_1.parquet"), &data.slice(half, data.num_rows() - half))?;
    std::fs::write(dir.join("README.txt"), "not a parquet file")?;

    let loaded = read_dataset(&dir, &test_config())?;
    assert_eq!(loaded.num_rows(), data.num_rows());
    assert_eq!(loaded.num_columns(), data.num_columns());

    let schema = loaded.schema();
    assert_eq!(schema.field_with_name("cohort")?.data_type(), &DataType::Int32);
    assert_eq!(schema.field_with_name("draftnumber")?.data_type(), &DataType::Int32);
    assert_eq!(schema.field_with_name("highnumber")?.data_type(), &DataType::Float64);

    // Service is only recorded for the core cohorts
    let sm = float_array(&loaded, "sm")?;
    assert!(sm.null_count() > 0);
    assert_eq!(
        float_array(&loaded, "crimerate")?.values(),
        float_array(&data, "crimerate")?.values()
    );

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[tokio::test]
async fn test_async_read_matches_sync() -> draft_lottery::Result<()> {
    let dir = scratch_dir("async");
    let file = dir.join("lottery.parquet");
    write_parquet(&file, &raw_dataset(20))?;

    let config = test_config();
    let sync = read_dataset(&file, &config)?;
    let from_file = read_dataset_async(&file, &config).await?;
    let from_dir = read_dataset_async(&dir, &config).await?;
    assert_eq!(sync, from_file);
    assert_eq!(sync, from_dir);

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_nan_becomes_missing() -> draft_lottery::Result<()> {
    let dir = scratch_dir("nan");
    let data = raw_dataset(5);
    let mut values: Vec<f64> = float_array(&data, "crimerate")?.values().to_vec();
    values[0] = f64::NAN;
    let data = draft_lottery::utils::arrow::with_columns(
        &data,
        vec![(
            "crimerate".to_string(),
            Arc::new(Float64Array::from(values)) as ArrayRef,
        )],
    )?;

    let file = dir.join("nan.parquet");
    write_parquet(&file, &data)?;
    let loaded = read_dataset(&file, &test_config())?;
    let crime = float_array(&loaded, "crimerate")?;
    assert!(crime.is_null(0));
    assert_eq!(crime.null_count(), 1);

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_missing_required_column() -> draft_lottery::Result<()> {
    let dir = scratch_dir("missing_column");
    let data = raw_dataset(5);
    let crime_idx = data.schema().index_of("crimerate")?;
    let keep: Vec<usize> = (0..data.num_columns()).filter(|i| *i != crime_idx).collect();
    let file = dir.join("no_crime.parquet");
    write_parquet(&file, &data.project(&keep)?)?;

    let result = read_dataset(&file, &test_config());
    assert!(matches!(result, Err(Error::Schema(_))));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_empty_directory() {
    let dir = scratch_dir("empty");
    let result = read_dataset(&dir, &test_config());
    assert!(matches!(result, Err(Error::Io(_))));
    std::fs::remove_dir_all(&dir).unwrap();
}
