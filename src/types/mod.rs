mod errors;
mod month_key;

pub use errors::DateError;
pub use month_key::{deserialize_api_date, parse_api_date, MonthKey};
