//! Persistence of extracted records, one destination per category.

use shelf_common::Record;
use shelf_config::Category;
use std::path::{Path, PathBuf};
use tracing::info;

/// Column order of every export.
pub const CSV_HEADER: [&str; 5] = ["title", "description", "price", "rating", "num_of_reviews"];

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("cannot prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Destination for one category's records.
pub trait RecordSink {
    fn write(&mut self, category: &Category, records: &[Record]) -> Result<(), ExportError>;
}

/// Writes `<dir>/<category>.csv`, replacing any previous file.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, category: &Category) -> PathBuf {
        self.dir.join(format!("{}.csv", category.name))
    }

    fn ensure_dir(dir: &Path) -> Result<(), ExportError> {
        std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })
    }
}

impl RecordSink for CsvSink {
    fn write(&mut self, category: &Category, records: &[Record]) -> Result<(), ExportError> {
        Self::ensure_dir(&self.dir)?;
        let path = self.path_for(category);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        writer.write_record(CSV_HEADER)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        info!(
            target: "shelf.export",
            category = %category.name,
            path = %path.display(),
            rows = records.len(),
            "catalog written"
        );
        Ok(())
    }
}
