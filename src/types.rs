use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Name given to a work's author when the author id has no stored record
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Anything a store can key by id
pub trait Keyed {
    fn id(&self) -> &str;
}

/// An author record from the authors dump
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Last segment of the `/authors/<id>` reference path
    pub id: String,
    pub name: String,
    pub personal_name: String,
}

/// A literary work from the works dump
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Last segment of the `/works/<id>` reference path
    pub id: String,

    /// The work's title
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_ids: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_ids: Option<Vec<String>>,

    /// Position-aligned with `author_ids`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_names: Option<Vec<String>>,
}

impl Author {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        personal_name: impl Into<String>,
    ) -> Self {
        Author {
            id: id.into(),
            name: name.into(),
            personal_name: personal_name.into(),
        }
    }
}

impl Book {
    /// Ids of authors whose name could not be resolved
    pub fn unresolved_author_ids(&self) -> Vec<&str> {
        match (&self.author_ids, &self.author_names) {
            (Some(ids), Some(names)) => ids
                .iter()
                .zip(names.iter())
                .filter(|(_, name)| name.as_str() == UNKNOWN_AUTHOR)
                .map(|(id, _)| id.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl Keyed for Author {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Keyed for Book {
    fn id(&self) -> &str {
        &self.id
    }
}
