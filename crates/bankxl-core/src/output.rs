//! Classifying written outputs and moving finished statements.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::RelocationError;
use crate::models::config::BankxlConfig;
use crate::models::statement::Statement;

/// Terminal bucket for a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Processed,
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Processed => f.write_str("processed"),
            Outcome::Failed => f.write_str("failed"),
        }
    }
}

/// Decides where finished statements go and moves them there.
#[derive(Debug, Clone)]
pub struct OutputClassifier {
    min_processed_bytes: u64,
    processed_dir: PathBuf,
    failed_dir: PathBuf,
}

impl OutputClassifier {
    /// Create a classifier; outputs larger than `min_processed_bytes` are processed.
    pub fn new(
        min_processed_bytes: u64,
        processed_dir: impl Into<PathBuf>,
        failed_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            min_processed_bytes,
            processed_dir: processed_dir.into(),
            failed_dir: failed_dir.into(),
        }
    }

    /// Build a classifier whose outcome directories live under `root`.
    pub fn from_config(config: &BankxlConfig, root: &Path) -> Self {
        Self::new(
            config.output.min_processed_bytes,
            root.join(&config.layout.processed_dir),
            root.join(&config.layout.failed_dir),
        )
    }

    /// Classify an output by its size in bytes.
    pub fn classify_size(&self, size: u64) -> Outcome {
        if size > self.min_processed_bytes {
            Outcome::Processed
        } else {
            Outcome::Failed
        }
    }

    /// Directory statements with `outcome` are moved to.
    pub fn dir_for(&self, outcome: Outcome) -> &Path {
        match outcome {
            Outcome::Processed => &self.processed_dir,
            Outcome::Failed => &self.failed_dir,
        }
    }

    /// Measure the statement's output, classify it, and relocate both files.
    ///
    /// Returns the outcome and the output size.
    pub fn finish(&self, statement: &mut Statement) -> Result<(Outcome, u64), RelocationError> {
        let output = statement.output_path();
        let size = fs::metadata(&output)
            .map_err(|source| RelocationError {
                from: output.clone(),
                to: output.clone(),
                rolled_back: true,
                stranded: None,
                source,
            })?
            .len();

        let outcome = self.classify_size(size);
        info!(
            "{}: output is {} bytes, classified {}",
            statement.source_name(),
            size,
            outcome
        );
        self.relocate(statement, outcome)?;
        Ok((outcome, size))
    }

    /// Move output and source into the outcome directory.
    ///
    /// If the source cannot be moved, the output is moved back so both files
    /// stay together. `rolled_back` is unset only when that move back fails.
    pub fn relocate(&self, statement: &mut Statement, outcome: Outcome) -> Result<(), RelocationError> {
        self.relocate_with(statement, outcome, |from, to| fs::rename(from, to))
    }

    fn relocate_with<F>(
        &self,
        statement: &mut Statement,
        outcome: Outcome,
        rename: F,
    ) -> Result<(), RelocationError>
    where
        F: Fn(&Path, &Path) -> std::io::Result<()>,
    {
        let dest_dir = self.dir_for(outcome);
        let output_from = statement.output_path();
        let source_from = statement.source_path();
        let output_to = dest_dir.join(statement.output_name());
        let source_to = dest_dir.join(statement.source_name());

        fs::create_dir_all(dest_dir).map_err(|source| RelocationError {
            from: source_from.clone(),
            to: dest_dir.to_path_buf(),
            rolled_back: true,
            stranded: None,
            source,
        })?;

        rename(&output_from, &output_to).map_err(|source| RelocationError {
            from: output_from.clone(),
            to: output_to.clone(),
            rolled_back: true,
            stranded: None,
            source,
        })?;

        if let Err(source) = rename(&source_from, &source_to) {
            warn!(
                "Moving {} failed, putting {} back",
                source_from.display(),
                output_from.display()
            );
            let stranded = match rename(&output_to, &output_from) {
                Ok(()) => None,
                Err(e) => {
                    error!(
                        "Could not move {} back to {}: {}",
                        output_to.display(),
                        output_from.display(),
                        e
                    );
                    Some(output_to)
                }
            };
            return Err(RelocationError {
                from: source_from,
                to: source_to,
                rolled_back: stranded.is_none(),
                stranded,
                source,
            });
        }

        statement.relocate_to(dest_dir);
        Ok(())
    }
}
