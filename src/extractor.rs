use crate::error::LoadError;
use crate::fields::Record;

/// Pull the JSON object out of a dump line.
///
/// Dump lines carry tab-separated metadata (type, key, revision, timestamp)
/// before the record itself; everything up to the first `{` is discarded.
pub fn extract_record(line_no: usize, line: &str) -> Result<Record, LoadError> {
    let start = line.find('{').ok_or_else(|| LoadError::Parse {
        line: line_no,
        reason: "no JSON object on line".to_string(),
    })?;

    serde_json::from_str(&line[start..]).map_err(|e| LoadError::Parse {
        line: line_no,
        reason: e.to_string(),
    })
}
