//! CSV table writer.
use std::{
    fs::File,
    path::{Path, PathBuf},
};

use log::info;
use serde::Serialize;

use crate::error::Error;

/// A CSV table being written. Rows are serialized with serde, the header
/// is derived from the first row.
pub struct Table {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl Table {
    pub fn create(dir: &Path, name: &str) -> Result<Self, Error> {
        let path = dir.join(name);
        let writer = csv::WriterBuilder::new().from_path(&path)?;
        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    pub fn write<T: Serialize>(&mut self, row: &T) -> Result<(), Error> {
        self.writer.serialize(row)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush the table, returning the number of rows written.
    pub fn finish(mut self) -> Result<usize, Error> {
        self.writer.flush()?;
        info!("{:?}: {} rows", self.path, self.rows);
        Ok(self.rows)
    }
}
