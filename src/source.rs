use crate::error::LoadError;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Lazily yields the lines of a dump file, numbered from 1.
///
/// The file handle is owned by the iterator and closed when it is dropped.
pub struct DumpLines {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
    failed: bool,
}

impl DumpLines {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| LoadError::FileAccess {
            path: path.clone(),
            line: None,
            source,
        })?;

        Ok(DumpLines {
            path,
            lines: BufReader::new(file).lines(),
            line_no: 0,
            failed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for DumpLines {
    type Item = Result<(usize, String), LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let line = self.lines.next()?;
        self.line_no += 1;

        match line {
            Ok(text) => Some(Ok((self.line_no, text))),
            Err(source) => {
                // A read error ends the stream
                self.failed = true;
                Some(Err(LoadError::FileAccess {
                    path: self.path.clone(),
                    line: Some(self.line_no),
                    source,
                }))
            }
        }
    }
}
