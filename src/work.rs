use crate::author::AUTHOR_KEY_PREFIX;
use crate::error::LoadError;
use crate::fields::{
    optional_array, optional_object, raw_text, required_string, string_or_default,
    strip_reference, Record,
};
use crate::store::AuthorLookup;
use crate::types::{Book, UNKNOWN_AUTHOR};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

pub const WORK_KEY_PREFIX: &str = "/works/";

/// `yyyy-MM-ddTHH:mm:ss.SSSSSS`, exactly six fractional digits
pub const CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%6f";

/// Build a [`Book`] from a works-dump record, resolving author names
/// through `authors`.
///
/// Fails when `key` is missing, when an `authors` entry lacks
/// `author.key`, or when `created.value` is not a valid timestamp.
/// Unknown author ids are not errors; they resolve to [`UNKNOWN_AUTHOR`].
pub fn book_from_record<L>(record: &Record, authors: &L) -> Result<Book, LoadError>
where
    L: AuthorLookup + ?Sized,
{
    let id = strip_reference(required_string(record, "key")?, WORK_KEY_PREFIX);

    let description =
        optional_object(record, "description").map(|d| string_or_default(d, "value"));

    let published_date = optional_object(record, "created")
        .map(|created| parse_created(&string_or_default(created, "value")))
        .transpose()?;

    let cover_ids =
        optional_array(record, "covers").map(|covers| covers.iter().map(raw_text).collect());

    let author_ids = optional_array(record, "authors")
        .map(|entries| entries.iter().map(author_entry_id).collect::<Result<Vec<_>, _>>())
        .transpose()?;

    let author_names = author_ids
        .as_ref()
        .map(|ids| resolve_author_names(ids, authors));

    Ok(Book {
        id,
        name: string_or_default(record, "title"),
        description,
        published_date,
        cover_ids,
        author_ids,
        author_names,
    })
}

/// Look up each id in order, substituting [`UNKNOWN_AUTHOR`] for misses
pub fn resolve_author_names<L>(ids: &[String], authors: &L) -> Vec<String>
where
    L: AuthorLookup + ?Sized,
{
    ids.iter()
        .map(|id| match authors.find_author(id) {
            Some(author) => author.name,
            None => UNKNOWN_AUTHOR.to_string(),
        })
        .collect()
}

fn author_entry_id(entry: &Value) -> Result<String, LoadError> {
    entry
        .get("author")
        .and_then(|author| author.get("key"))
        .and_then(Value::as_str)
        .map(|key| strip_reference(key, AUTHOR_KEY_PREFIX))
        .ok_or_else(|| LoadError::missing("authors[].author.key"))
}

fn parse_created(value: &str) -> Result<NaiveDate, LoadError> {
    NaiveDateTime::parse_from_str(value, CREATED_FORMAT)
        .map(|ts| ts.date())
        .map_err(|source| LoadError::InvalidDate {
            field: "created.value".to_string(),
            value: value.to_string(),
            source,
        })
}
