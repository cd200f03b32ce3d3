//! Dump import driver
//!
//! Each dump is processed one line at a time: read, extract, transform,
//! save. Bad lines and bad records are counted and recorded in an
//! [`ImportSummary`]; only failing to read the dump itself stops an import.

use crate::author::author_from_record;
use crate::config::ImportConfig;
use crate::error::{LoadError, Severity, StoreError};
use crate::extractor::extract_record;
use crate::fields::Record;
use crate::source::DumpLines;
use crate::store::{AuthorLookup, EntityStore};
use crate::types::{Author, Book, Keyed, UNKNOWN_AUTHOR};
use crate::work::book_from_record;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Which dump a summary describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpKind {
    Authors,
    Works,
}

impl fmt::Display for DumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpKind::Authors => f.write_str("authors"),
            DumpKind::Works => f.write_str("works"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// The line held no parseable record
    Skipped,
    /// The record parsed but could not be turned into an entity or saved
    Failed,
}

/// One problem line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub line: usize,
    pub kind: IssueKind,
    pub message: String,
}

/// Outcome of importing a single dump
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub dump: DumpKind,
    pub lines_read: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
    /// The first problems encountered, up to the configured limit
    pub issues: Vec<Issue>,
}

impl ImportSummary {
    fn new(dump: DumpKind) -> Self {
        ImportSummary {
            dump,
            lines_read: 0,
            saved: 0,
            skipped: 0,
            failed: 0,
            issues: Vec::new(),
        }
    }

    /// Issues that were counted but not kept
    pub fn issues_dropped(&self) -> usize {
        (self.skipped + self.failed).saturating_sub(self.issues.len())
    }
}

/// A dump import stopped by a fatal error.
///
/// Records saved before the failure stay in the store; `partial` counts
/// them. It is `None` when the dump could not be opened at all.
#[derive(Debug, Error)]
#[error("{dump} import aborted")]
pub struct ImportAborted {
    pub dump: DumpKind,
    #[source]
    pub error: LoadError,
    pub partial: Option<ImportSummary>,
}

/// Runs dump imports against caller-supplied stores
#[derive(Debug, Clone)]
pub struct Importer {
    max_recorded_issues: usize,
    progress_interval: usize,
}

impl Default for Importer {
    fn default() -> Self {
        Importer::from_config(&ImportConfig::default())
    }
}

impl Importer {
    pub fn from_config(config: &ImportConfig) -> Self {
        Importer {
            max_recorded_issues: config.max_recorded_issues,
            progress_interval: config.progress_interval,
        }
    }

    /// Load the authors dump at `path` into `authors`
    pub fn import_authors<S>(&self, path: &Path, authors: &mut S) -> Result<ImportSummary, ImportAborted>
    where
        S: EntityStore<Author> + ?Sized,
    {
        self.run(DumpKind::Authors, path, authors, |record| {
            Ok(author_from_record(record))
        })
    }

    /// Load the works dump at `path` into `books`.
    ///
    /// Author names are resolved through `authors` as each work is read, so
    /// the authors dump must be imported first. Ids that are not yet known
    /// get the placeholder name; [`resolve_deferred_names`] can fix them up
    /// after the fact.
    pub fn import_works<A, B>(
        &self,
        path: &Path,
        authors: &A,
        books: &mut B,
    ) -> Result<ImportSummary, ImportAborted>
    where
        A: AuthorLookup + ?Sized,
        B: EntityStore<Book> + ?Sized,
    {
        self.run(DumpKind::Works, path, books, |record| {
            book_from_record(record, authors)
        })
    }

    fn run<T, S, F>(
        &self,
        dump: DumpKind,
        path: &Path,
        store: &mut S,
        mut transform: F,
    ) -> Result<ImportSummary, ImportAborted>
    where
        T: Keyed,
        S: EntityStore<T> + ?Sized,
        F: FnMut(&Record) -> Result<T, LoadError>,
    {
        let lines = DumpLines::open(path).map_err(|error| ImportAborted {
            dump,
            error,
            partial: None,
        })?;
        let mut summary = ImportSummary::new(dump);

        info!(%dump, path = %path.display(), "starting import");

        for item in lines {
            let (line_no, line) = match item {
                Ok(numbered) => numbered,
                Err(error) => return Err(abort(summary, error)),
            };
            summary.lines_read += 1;

            let outcome = extract_record(line_no, &line)
                .and_then(|record| transform(&record))
                .and_then(|entity| store.save(entity).map_err(LoadError::from));

            match outcome {
                Ok(()) => summary.saved += 1,
                Err(error) if error.severity() == Severity::Fatal => {
                    return Err(abort(summary, error))
                }
                Err(error) => self.record_issue(&mut summary, line_no, &error),
            }

            if self.progress_interval > 0 && summary.lines_read % self.progress_interval == 0 {
                info!(
                    %dump,
                    lines = summary.lines_read,
                    saved = summary.saved,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "import progress"
                );
            }
        }

        info!(
            %dump,
            lines = summary.lines_read,
            saved = summary.saved,
            skipped = summary.skipped,
            failed = summary.failed,
            "finished import"
        );
        Ok(summary)
    }

    fn record_issue(&self, summary: &mut ImportSummary, line: usize, error: &LoadError) {
        let kind = match error.severity() {
            Severity::Skip => {
                summary.skipped += 1;
                warn!(dump = %summary.dump, line, %error, "skipping unparseable line");
                IssueKind::Skipped
            }
            _ => {
                summary.failed += 1;
                warn!(dump = %summary.dump, line, %error, "record not saved");
                IssueKind::Failed
            }
        };

        if summary.issues.len() < self.max_recorded_issues {
            let message = match error {
                LoadError::Parse { reason, .. } => reason.clone(),
                other => other.to_string(),
            };
            summary.issues.push(Issue {
                line,
                kind,
                message,
            });
        }
    }
}

fn abort(summary: ImportSummary, error: LoadError) -> ImportAborted {
    warn!(
        dump = %summary.dump,
        lines = summary.lines_read,
        saved = summary.saved,
        %error,
        "import aborted"
    );
    ImportAborted {
        dump: summary.dump,
        error,
        partial: Some(summary),
    }
}

/// Re-resolve placeholder author names on every stored book.
///
/// Use after both dumps are loaded when works may have been imported
/// before some of their authors. Returns the number of books updated.
pub fn resolve_deferred_names<B, A>(books: &mut B, authors: &A) -> Result<usize, StoreError>
where
    B: EntityStore<Book> + ?Sized,
    A: AuthorLookup + ?Sized,
{
    let mut updated = 0;

    for id in books.ids() {
        let Some(mut book) = books.find_by_id(&id)? else {
            continue;
        };

        let (Some(ids), Some(names)) = (&book.author_ids, &mut book.author_names) else {
            continue;
        };

        let mut changed = false;
        for (author_id, name) in ids.iter().zip(names.iter_mut()) {
            if name.as_str() != UNKNOWN_AUTHOR {
                continue;
            }
            if let Some(author) = authors.find_author(author_id) {
                *name = author.name;
                changed = true;
            }
        }

        if changed {
            debug!(book_id = %id, "resolved deferred author names");
            books.save(book)?;
            updated += 1;
        }
    }

    info!(updated, "deferred author resolution finished");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::io::Write;

    fn dump(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_authors_import_skips_bad_lines() {
        let file = dump(&[
            "/type/author\t/authors/OL1A\t1\t2008-04-01T03:28:50.625462\t{\"key\":\"/authors/OL1A\",\"name\":\"J K Rowling\",\"personal_name\":\"Rowling\"}",
            "/type/author\t/authors/OL2A\t1\t2008-04-01T03:28:50.625462\t{\"key\":\"/authors/OL2A\",",
            "",
            "/type/author\t/authors/OL3A\t1\t2008-04-01T03:28:50.625462\t{\"key\":\"/authors/OL3A\",\"name\":\"Third\"}",
        ]);

        let mut authors: MemoryStore<Author> = MemoryStore::new();
        let summary = Importer::default()
            .import_authors(file.path(), &mut authors)
            .unwrap();

        assert_eq!(summary.dump, DumpKind::Authors);
        assert_eq!(summary.lines_read, 4);
        assert_eq!(summary.saved, 2);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.issues.len(), 2);
        assert_eq!(summary.issues[0].line, 2);
        assert_eq!(summary.issues[0].kind, IssueKind::Skipped);
        assert!(!summary.issues[0].message.starts_with("line "));
        assert_eq!(summary.issues[1].message, "no JSON object on line");

        assert_eq!(authors.len(), 2);
        assert_eq!(
            authors.find_by_id("OL1A").unwrap(),
            Some(Author::new("OL1A", "J K Rowling", "Rowling"))
        );
        assert_eq!(authors.get("OL3A").unwrap().name, "Third");
    }

    #[test]
    fn test_works_import_isolates_record_failures() {
        let file = dump(&[
            "/type/work\t/works/OL1W\t1\t-\t{\"title\":\"No key\"}",
            "/type/work\t/works/OL5W\t1\t-\t{\"key\":\"/works/OL5W\",\"title\":\"Hary Potter\",\"authors\":[{\"author\":{\"key\":\"/authors/OL1A\"}},{\"author\":{\"key\":\"/authors/OL2A\"}}]}",
            "/type/work\t/works/OL6W\t1\t-\t{\"key\":\"/works/OL6W\",\"created\":{\"value\":\"yesterday\"}}",
        ]);

        let authors: MemoryStore<Author> =
            std::iter::once(Author::new("OL1A", "J K Rowling", "Rowling")).collect();
        let mut books: MemoryStore<Book> = MemoryStore::new();
        let summary = Importer::default()
            .import_works(file.path(), &authors, &mut books)
            .unwrap();

        assert_eq!(summary.saved, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.skipped, 0);
        assert!(summary.issues.iter().all(|i| i.kind == IssueKind::Failed));
        assert_eq!(
            summary.issues.iter().map(|i| i.line).collect::<Vec<_>>(),
            vec![1, 3]
        );

        assert_eq!(books.ids(), vec!["OL5W"]);
        let book = books.get("OL5W").unwrap();
        assert_eq!(
            book.author_names,
            Some(vec!["J K Rowling".to_string(), UNKNOWN_AUTHOR.to_string()])
        );
    }

    #[test]
    fn test_reimport_overwrites() {
        let first = dump(&["x\t{\"key\":\"/authors/OL1A\",\"name\":\"Old\"}"]);
        let second = dump(&[
            "x\t{\"key\":\"/authors/OL1A\",\"name\":\"New\"}",
            "x\t{\"key\":\"/authors/OL1A\",\"name\":\"New\"}",
        ]);

        let importer = Importer::default();
        let mut authors: MemoryStore<Author> = MemoryStore::new();
        importer.import_authors(first.path(), &mut authors).unwrap();
        let summary = importer.import_authors(second.path(), &mut authors).unwrap();

        assert_eq!(summary.saved, 2);
        assert_eq!(authors.len(), 1);
        assert_eq!(authors.get("OL1A").unwrap().name, "New");
    }

    #[test]
    fn test_missing_dump_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut authors: MemoryStore<Author> = MemoryStore::new();
        let err = Importer::default()
            .import_authors(&dir.path().join("absent.txt"), &mut authors)
            .unwrap_err();

        assert_eq!(err.dump, DumpKind::Authors);
        assert_eq!(err.error.severity(), Severity::Fatal);
        assert!(err.partial.is_none());
        assert!(authors.is_empty());
    }

    #[test]
    fn test_read_error_keeps_partial_summary() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"x\t{\"key\":\"/authors/OL1A\",\"name\":\"A\"}\nbroken\nx\t\xff\xfe\nx\t{\"key\":\"/authors/OL2A\"}\n")
            .unwrap();

        let mut authors: MemoryStore<Author> = MemoryStore::new();
        let err = Importer::default()
            .import_authors(file.path(), &mut authors)
            .unwrap_err();

        assert!(matches!(err.error, LoadError::FileAccess { line: Some(3), .. }));
        let partial = err.partial.unwrap();
        assert_eq!(partial.lines_read, 2);
        assert_eq!(partial.saved, 1);
        assert_eq!(partial.skipped, 1);
        assert_eq!(authors.ids(), vec!["OL1A"]);
    }

    /// Rejects saves for the listed ids and fails every lookup
    struct FlakyStore {
        inner: MemoryStore<Author>,
        reject: Vec<String>,
    }

    impl FlakyStore {
        fn io_error(id: &str) -> StoreError {
            StoreError::Io {
                path: format!("flaky/{}", id).into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            }
        }
    }

    impl EntityStore<Author> for FlakyStore {
        fn save(&mut self, entity: Author) -> Result<(), StoreError> {
            if self.reject.iter().any(|id| id == &entity.id) {
                return Err(Self::io_error(&entity.id));
            }
            self.inner.save(entity)
        }

        fn find_by_id(&self, id: &str) -> Result<Option<Author>, StoreError> {
            Err(Self::io_error(id))
        }

        fn ids(&self) -> Vec<String> {
            self.inner.ids()
        }

        fn len(&self) -> usize {
            self.inner.len()
        }
    }

    #[test]
    fn test_save_error_fails_only_that_record() {
        let file = dump(&[
            "x\t{\"key\":\"/authors/OL1A\",\"name\":\"A\"}",
            "x\t{\"key\":\"/authors/OL2A\",\"name\":\"B\"}",
            "x\t{\"key\":\"/authors/OL3A\",\"name\":\"C\"}",
        ]);

        let mut authors = FlakyStore {
            inner: MemoryStore::new(),
            reject: vec!["OL2A".to_string()],
        };
        let summary = Importer::default()
            .import_authors(file.path(), &mut authors)
            .unwrap();

        assert_eq!(summary.lines_read, 3);
        assert_eq!(summary.saved, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.issues[0].line, 2);
        assert_eq!(summary.issues[0].kind, IssueKind::Failed);
        assert!(summary.issues[0].message.contains("disk full"));
        assert_eq!(authors.ids(), vec!["OL1A", "OL3A"]);
    }

    #[test]
    fn test_lookup_error_resolves_to_unknown_author() {
        let file = dump(&[
            "x\t{\"key\":\"/works/OL5W\",\"authors\":[{\"author\":{\"key\":\"/authors/OL1A\"}}]}",
        ]);

        let mut authors = FlakyStore {
            inner: MemoryStore::new(),
            reject: Vec::new(),
        };
        authors.save(Author::new("OL1A", "J K Rowling", "Rowling")).unwrap();

        let mut books: MemoryStore<Book> = MemoryStore::new();
        let summary = Importer::default()
            .import_works(file.path(), &authors, &mut books)
            .unwrap();

        assert_eq!(summary.saved, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(
            books.get("OL5W").unwrap().author_names,
            Some(vec![UNKNOWN_AUTHOR.to_string()])
        );
    }

    #[test]
    fn test_issue_list_is_capped() {
        let lines: Vec<String> = (0..10).map(|i| format!("garbage {}", i)).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let file = dump(&refs);

        let importer = Importer::from_config(&ImportConfig {
            max_recorded_issues: 3,
            ..ImportConfig::default()
        });
        let mut authors: MemoryStore<Author> = MemoryStore::new();
        let summary = importer.import_authors(file.path(), &mut authors).unwrap();

        assert_eq!(summary.skipped, 10);
        assert_eq!(summary.issues.len(), 3);
        assert_eq!(summary.issues_dropped(), 7);
    }

    #[test]
    fn test_deferred_resolution() {
        let mut books: MemoryStore<Book> = vec![
            Book {
                id: "OL5W".into(),
                author_ids: Some(vec!["OL1A".into(), "OL2A".into(), "OL3A".into()]),
                author_names: Some(vec![
                    "Already Known".into(),
                    UNKNOWN_AUTHOR.into(),
                    UNKNOWN_AUTHOR.into(),
                ]),
                ..Book::default()
            },
            Book {
                id: "OL6W".into(),
                ..Book::default()
            },
        ]
        .into_iter()
        .collect();

        let authors: MemoryStore<Author> = vec![
            Author::new("OL1A", "Renamed", ""),
            Author::new("OL2A", "Second", ""),
        ]
        .into_iter()
        .collect();

        let updated = resolve_deferred_names(&mut books, &authors).unwrap();
        assert_eq!(updated, 1);

        let names = books.get("OL5W").unwrap().author_names.clone().unwrap();
        assert_eq!(names, vec!["Already Known", "Second", UNKNOWN_AUTHOR]);

        assert_eq!(resolve_deferred_names(&mut books, &authors).unwrap(), 0);
    }
}
