//! # bookload - bibliographic dump loader
//!
//! Imports the authors and works dumps of a bibliographic catalogue into
//! keyed stores. Each dump line carries some tab-separated metadata followed
//! by a JSON record; works reference their authors by id, and author names
//! are copied into each work as it is loaded.
//!
//! ## Modules
//!
//! - **source**: lazy, numbered lines from a dump file
//! - **extractor**: JSON record extraction from a dump line
//! - **fields**: field accessors and defaulting rules
//! - **author** / **work**: record to entity transformation
//! - **import**: the per-dump import driver and run summaries
//! - **store**: the upsert/lookup store contract and two implementations
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bookload::{Author, Book, Importer, MemoryStore};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let importer = Importer::default();
//! let mut authors: MemoryStore<Author> = MemoryStore::new();
//! let mut books: MemoryStore<Book> = MemoryStore::new();
//!
//! // Authors first, so works can resolve author names
//! importer.import_authors(Path::new("ol_dump_authors.txt"), &mut authors)?;
//! let summary = importer.import_works(Path::new("ol_dump_works.txt"), &authors, &mut books)?;
//!
//! println!("{} works saved, {} failed", summary.saved, summary.failed);
//! # Ok(())
//! # }
//! ```

use serde::Serialize;

pub mod author;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fields;
pub mod import;
pub mod source;
pub mod store;
pub mod types;
pub mod work;

pub use config::LoaderConfig;
pub use error::{LoadError, Severity, StoreError};
pub use import::{
    resolve_deferred_names, DumpKind, ImportAborted, ImportSummary, Importer, Issue, IssueKind,
};
pub use store::{AuthorLookup, EntityStore, JsonlStore, MemoryStore};
pub use types::{Author, Book, Keyed, UNKNOWN_AUTHOR};

/// Result of importing one dump
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DumpOutcome {
    Completed(ImportSummary),
    Failed {
        error: String,
        /// Counts up to the failure, when the dump was opened
        #[serde(skip_serializing_if = "Option::is_none")]
        partial: Option<ImportSummary>,
    },
}

/// Result of the deferred author-name pass
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeferredOutcome {
    Completed { updated: usize },
    Failed { error: String },
}

/// Everything that happened during [`load_dumps`]
#[derive(Debug, Default, Serialize)]
pub struct LoadReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<DumpOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub works: Option<DumpOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deferred: Option<DeferredOutcome>,
}

impl LoadReport {
    /// Whether any dump or the deferred pass stopped on a fatal error
    pub fn has_failures(&self) -> bool {
        let dump_failed = |o: &Option<DumpOutcome>| matches!(o, Some(DumpOutcome::Failed { .. }));
        dump_failed(&self.authors)
            || dump_failed(&self.works)
            || matches!(self.deferred, Some(DeferredOutcome::Failed { .. }))
    }
}

/// Main entry point: load the configured dumps into the given stores.
///
/// The authors dump runs first. A dump that cannot be read is recorded as
/// failed and does not prevent the other from loading.
///
/// When enabled, the deferred pass runs after any run that loaded authors
/// and fills in placeholder names on books already in `books`, including
/// books saved by earlier runs against the same stores.
pub fn load_dumps<A, B>(config: &LoaderConfig, authors: &mut A, books: &mut B) -> LoadReport
where
    A: EntityStore<Author>,
    B: EntityStore<Book>,
{
    let importer = Importer::from_config(&config.import);
    let mut report = LoadReport::default();

    if let Some(path) = &config.datadump.author {
        report.authors = Some(outcome(importer.import_authors(path, authors)));
    }

    if let Some(path) = &config.datadump.works {
        report.works = Some(outcome(importer.import_works(path, &*authors, books)));
    }

    // Works loaded in this run already saw every author, so only new
    // authors can repair placeholders
    let authors_loaded = matches!(report.authors, Some(DumpOutcome::Completed(_)));
    if authors_loaded && config.import.deferred_resolution {
        report.deferred = Some(match resolve_deferred_names(books, &*authors) {
            Ok(updated) => DeferredOutcome::Completed { updated },
            Err(error) => {
                tracing::error!(%error, "deferred author resolution failed");
                DeferredOutcome::Failed {
                    error: error.to_string(),
                }
            }
        });
    }

    report
}

fn outcome(result: Result<ImportSummary, ImportAborted>) -> DumpOutcome {
    match result {
        Ok(summary) => DumpOutcome::Completed(summary),
        Err(aborted) => {
            tracing::error!(dump = %aborted.dump, error = %aborted.error, "dump import aborted");
            DumpOutcome::Failed {
                error: aborted.error.to_string(),
                partial: aborted.partial,
            }
        }
    }
}
