mod month_grouper;

pub use month_grouper::{MonthBatch, MonthGrouper};
