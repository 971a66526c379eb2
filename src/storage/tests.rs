use super::{account_output_path, CsvSink, CSV_HEADERS};

use anyhow::Result;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::grouping::MonthBatch;
use crate::models::UsageRecord;
use crate::types::MonthKey;

const HEADER_ROW: &str = "Account SID,Category,Description,Start Date,End Date,Count,Count Unit,Usage,Usage Unit,Price,Price Unit";

fn create_batch(categories: &[&str], price: Option<&str>) -> Result<MonthBatch> {
    let start_date = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or_else(|| anyhow::anyhow!("invalid date"))?;
    let end_date = NaiveDate::from_ymd_opt(2024, 1, 31).ok_or_else(|| anyhow::anyhow!("invalid date"))?;

    let records = categories.iter().map(|category| UsageRecord {
        account_id: "AC123".to_string(),
        category: category.to_string(),
        description: Some(format!("{category}, billed")),
        start_date,
        end_date,
        count: Some("3".to_string()),
        count_unit: Some("messages".to_string()),
        usage: Some("3".to_string()),
        usage_unit: Some("messages".to_string()),
        price: price.map(str::to_string),
        price_unit: Some("usd".to_string())
    }).collect();

    Ok(MonthBatch {
        key: MonthKey::new(2024, 1),
        records
    })
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    Ok(fs::read_to_string(path)?.lines().map(str::to_string).collect())
}

#[test]
fn test_header_matches_expected_column_layout() {
    assert_eq!(CSV_HEADERS.join(","), HEADER_ROW);
}

#[test]
fn test_sink_writes_header_on_create_even_without_records() -> Result<()> {
    let directory = TempDir::new()?;
    let path = account_output_path(directory.path(), "AC123");

    let sink = CsvSink::create(&path)?;

    assert_eq!(sink.rows_written(), 0);
    assert_eq!(sink.path(), path.as_path());
    assert_eq!(read_lines(&path)?, vec![HEADER_ROW.to_string()]);

    Ok(())
}

#[test]
fn test_sink_appends_batches_in_order() -> Result<()> {
    let directory = TempDir::new()?;
    let path = account_output_path(directory.path(), "AC123");

    let mut sink = CsvSink::create(&path)?;
    sink.append(&create_batch(&["sms", "calls"], Some("1.2300"))?)?;
    sink.append(&create_batch(&["mms"], None)?)?;

    let lines = read_lines(&path)?;

    assert_eq!(sink.rows_written(), 3);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], HEADER_ROW);
    assert_eq!(lines[1], "AC123,sms,\"sms, billed\",2024-01-01,2024-01-31,3,messages,3,messages,1.2300,usd");
    assert_eq!(lines[2], "AC123,calls,\"calls, billed\",2024-01-01,2024-01-31,3,messages,3,messages,1.2300,usd");
    assert_eq!(lines[3], "AC123,mms,\"mms, billed\",2024-01-01,2024-01-31,3,messages,3,messages,,usd");

    Ok(())
}

#[test]
fn test_second_export_overwrites_the_previous_file() -> Result<()> {
    let directory = TempDir::new()?;
    let path = account_output_path(directory.path(), "AC123");

    let mut first_run = CsvSink::create(&path)?;
    first_run.append(&create_batch(&["first-a", "first-b", "first-c"], None)?)?;
    drop(first_run);

    let mut second_run = CsvSink::create(&path)?;
    second_run.append(&create_batch(&["second"], None)?)?;
    drop(second_run);

    let lines = read_lines(&path)?;

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], HEADER_ROW);
    assert!(lines[1].starts_with("AC123,second,"));

    Ok(())
}

#[test]
fn test_sink_creation_fails_for_missing_directory() -> Result<()> {
    let directory = TempDir::new()?;
    let path = account_output_path(&directory.path().join("missing"), "AC123");

    assert!(CsvSink::create(&path).is_err());

    Ok(())
}

#[test]
fn test_output_path_is_derived_from_account_id() {
    let path = account_output_path(Path::new("exports"), "AC0123456789");

    assert_eq!(path, Path::new("exports").join("AC0123456789.csv"));
}
