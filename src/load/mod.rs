//! Loading of the script-global data files that make up a report directory.

pub mod parse;
pub mod source;

pub use parse::{load_data_file, write_data_file};
pub use source::DataFile;

use crate::diagnostics;

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A data file that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub file: DataFile,
    pub path: PathBuf,
    pub reason: String,
}

/// Records of every data file that loaded, plus the ones that did not.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    records: BTreeMap<DataFile, Vec<Value>>,
    failures: Vec<LoadFailure>,
}

impl DataSet {
    /// Load `files` from `dir`. Failures are recorded, never returned.
    pub fn load(dir: &Path, files: &[DataFile]) -> DataSet {
        let mut set = DataSet::default();
        for &file in files {
            match load_data_file(dir, file) {
                Ok(records) => {
                    set.records.insert(file, records);
                }
                Err(err) => {
                    let reason = diagnostics::error_message(format!("{:#}", err));
                    diagnostics::warn(format!("skipping {}: {}", file, reason));
                    set.failures.push(LoadFailure {
                        file,
                        path: dir.join(file.file_name()),
                        reason,
                    });
                }
            }
        }
        set
    }

    #[cfg(test)]
    pub fn from_records(records: impl IntoIterator<Item = (DataFile, Vec<Value>)>) -> DataSet {
        DataSet {
            records: records.into_iter().collect(),
            failures: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn push_failure(&mut self, failure: LoadFailure) {
        self.records.remove(&failure.file);
        self.failures.push(failure);
    }

    /// Records of `file`; empty if it is not loaded.
    pub fn records(&self, file: DataFile) -> &[Value] {
        self.records.get(&file).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Failures among `files`, in the order the files are listed.
    pub fn failures_for(&self, files: &[DataFile]) -> Vec<&LoadFailure> {
        files
            .iter()
            .filter_map(|f| self.failures.iter().find(|fail| fail.file == *f))
            .collect()
    }
}
