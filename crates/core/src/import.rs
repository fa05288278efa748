//! One-shot import of an outline file into the code store.
//!
//! The import never aborts on a bad line. Malformed lines, lines without a resolvable
//! parent, lines that would create a cycle and lines whose upsert fails are logged and
//! counted, and processing continues with the next line. Because every write is an upsert
//! keyed by code, an interrupted import can simply be run again.

use crate::error::{CodeError, CodeResult};
use crate::node::UpsertOutcome;
use crate::outline::{OutlineEntry, OutlineReader};
use crate::store::CodeStore;
use crate::tree::TreeBuilder;
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

/// Counts gathered over one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Non-blank lines handed to the builder, malformed ones included.
    pub entries_seen: usize,
    pub created: usize,
    pub updated: usize,
    pub malformed: usize,
    pub orphaned: usize,
    pub cycles: usize,
    pub storage_failures: usize,
    /// Set when reading the source failed part way through.
    pub read_aborted: bool,
}

impl ImportSummary {
    fn started() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            entries_seen: 0,
            created: 0,
            updated: 0,
            malformed: 0,
            orphaned: 0,
            cycles: 0,
            storage_failures: 0,
            read_aborted: false,
        }
    }

    pub fn imported(&self) -> usize {
        self.created + self.updated
    }

    pub fn skipped(&self) -> usize {
        self.malformed + self.orphaned + self.cycles + self.storage_failures
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries: {} created, {} updated, {} skipped \
             (malformed {}, missing parent {}, cycle {}, storage {}) in {}ms",
            self.entries_seen,
            self.created,
            self.updated,
            self.skipped(),
            self.malformed,
            self.orphaned,
            self.cycles,
            self.storage_failures,
            (self.finished_at - self.started_at).num_milliseconds()
        )?;
        if self.read_aborted {
            write!(f, "; reading stopped early")?;
        }
        Ok(())
    }
}

/// Imports classification outlines into a [`CodeStore`].
#[derive(Clone)]
pub struct ImportService {
    store: Arc<dyn CodeStore>,
}

impl ImportService {
    pub fn new(store: Arc<dyn CodeStore>) -> Self {
        Self { store }
    }

    /// Imports the outline at `path`.
    ///
    /// A missing file is not an error: it is logged and an empty summary is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::OutlineOpen`] if the file exists but cannot be opened.
    pub fn import_path(&self, path: &Path) -> CodeResult<ImportSummary> {
        if !path.exists() {
            tracing::warn!(
                "Outline not found at {}, skipping ICD-10 import",
                path.display()
            );
            return Ok(ImportSummary::started());
        }

        tracing::info!("Importing ICD-10 outline from {}", path.display());
        let reader = OutlineReader::open(path)?;
        Ok(self.import_entries(reader))
    }

    pub fn import_reader<R: BufRead>(&self, reader: R) -> ImportSummary {
        self.import_entries(OutlineReader::new(reader))
    }

    /// Feeds parsed entries through a fresh [`TreeBuilder`], in order.
    pub fn import_entries<I>(&self, entries: I) -> ImportSummary
    where
        I: IntoIterator<Item = CodeResult<OutlineEntry>>,
    {
        let mut summary = ImportSummary::started();
        let mut builder = TreeBuilder::new(self.store.as_ref());

        for item in entries {
            let entry = match item {
                Ok(entry) => entry,
                Err(CodeError::MalformedLine { line_number, line, .. }) => {
                    tracing::warn!("Skipping malformed line {}: {:?}", line_number, line);
                    summary.entries_seen += 1;
                    summary.malformed += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!("Stopping import, outline could not be read: {}", e);
                    summary.read_aborted = true;
                    break;
                }
            };

            summary.entries_seen += 1;
            match builder.attach(&entry) {
                Ok((_, UpsertOutcome::Created)) => summary.created += 1,
                Ok((_, UpsertOutcome::Updated)) => summary.updated += 1,
                Err(e @ CodeError::MissingParent { .. }) => {
                    tracing::warn!("Skipping line: {}", e);
                    summary.orphaned += 1;
                }
                Err(e @ CodeError::AncestorCycle { .. }) => {
                    tracing::warn!("Skipping line: {}", e);
                    summary.cycles += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "Error processing line {} ({}): {}",
                        entry.line_number,
                        entry.code,
                        e
                    );
                    summary.storage_failures += 1;
                }
            }
        }

        summary.finished_at = Utc::now();
        tracing::info!("ICD-10 import completed: {}", summary);
        summary
    }
}
