use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};

use crate::grouping::MonthBatch;

pub const CSV_HEADERS: [&str; 11] = [
    "Account SID",
    "Category",
    "Description",
    "Start Date",
    "End Date",
    "Count",
    "Count Unit",
    "Usage",
    "Usage Unit",
    "Price",
    "Price Unit",
];

/// Append-only CSV output for one account's export.
///
/// Opening always truncates and writes the header row; after that the only
/// operation is appending whole batches.
pub struct CsvSink {
    path: PathBuf,
    writer: Writer<BufWriter<File>>,
    rows_written: usize
}

impl CsvSink {
    /// Creates (or truncates) the file at `path` and writes the header row.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, csv::Error> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;

        //NOTE: Headers are written explicitly so that an export with no records still produces a valid file
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        writer.write_record(CSV_HEADERS)?;
        writer.flush()?;

        Ok(Self {
            path,
            writer,
            rows_written: 0
        })
    }

    /// Appends every record of the batch in order and flushes to disk.
    pub fn append(&mut self, batch: &MonthBatch) -> Result<(), csv::Error> {
        for record in &batch.records {
            self.writer.serialize(record)?;
        }

        self.writer.flush()?;
        self.rows_written += batch.len();

        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The output file for an account: `<output_dir>/<account_id>.csv`.
pub fn account_output_path(output_dir: &Path, account_id: &str) -> PathBuf {
    output_dir.join(format!("{account_id}.csv"))
}
