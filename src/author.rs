use crate::fields::{string_or_default, strip_reference, Record};
use crate::types::Author;

pub const AUTHOR_KEY_PREFIX: &str = "/authors/";

/// Build an [`Author`] from an authors-dump record.
///
/// Every field is optional: a record without `key` yields an author with an
/// empty id rather than an error. Works treat a missing `key` as fatal; see
/// [`crate::work::book_from_record`].
pub fn author_from_record(record: &Record) -> Author {
    Author {
        id: strip_reference(&string_or_default(record, "key"), AUTHOR_KEY_PREFIX),
        name: string_or_default(record, "name"),
        personal_name: string_or_default(record, "personal_name"),
    }
}
