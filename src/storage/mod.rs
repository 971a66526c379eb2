mod csv_sink;
#[cfg(test)]
mod tests;

pub use csv_sink::{account_output_path, CsvSink, CSV_HEADERS};
