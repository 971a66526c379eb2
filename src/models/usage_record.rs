use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{deserialize_api_date, MonthKey};

/// One line-item of billed usage for an account.
///
/// Deserializes from the usage API's JSON representation and serializes to the
/// export CSV's column layout. Field order here is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(rename(serialize = "Account SID", deserialize = "account_sid"))]
    pub account_id: String,
    #[serde(rename(serialize = "Category", deserialize = "category"))]
    pub category: String,
    #[serde(rename(serialize = "Description", deserialize = "description"), default)]
    pub description: Option<String>,
    #[serde(rename(serialize = "Start Date", deserialize = "start_date"), deserialize_with = "deserialize_api_date")]
    pub start_date: NaiveDate,
    #[serde(rename(serialize = "End Date", deserialize = "end_date"), deserialize_with = "deserialize_api_date")]
    pub end_date: NaiveDate,
    #[serde(rename(serialize = "Count", deserialize = "count"), default, deserialize_with = "deserialize_text")]
    pub count: Option<String>,
    #[serde(rename(serialize = "Count Unit", deserialize = "count_unit"), default)]
    pub count_unit: Option<String>,
    #[serde(rename(serialize = "Usage", deserialize = "usage"), default, deserialize_with = "deserialize_text")]
    pub usage: Option<String>,
    #[serde(rename(serialize = "Usage Unit", deserialize = "usage_unit"), default)]
    pub usage_unit: Option<String>,
    #[serde(rename(serialize = "Price", deserialize = "price"), default, deserialize_with = "deserialize_text")]
    pub price: Option<String>,
    #[serde(rename(serialize = "Price Unit", deserialize = "price_unit"), default)]
    pub price_unit: Option<String>
}

impl UsageRecord {
    /// The (year, month) this record belongs to, taken from its start date.
    pub fn month_key(&self) -> MonthKey {
        MonthKey::from(self.start_date)
    }
}

//NOTE: The API sends counts, usage and prices as strings, but numbers are accepted too and kept as their literal text.
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string())
    })
}
