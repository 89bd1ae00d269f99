//! Database namespace type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated database + collection pair.
///
/// Written as `database.collection`; the first `.` separates the two
/// halves, so collection names may themselves contain dots.
///
/// # Example
///
/// ```
/// use atlas_core::Namespace;
///
/// let ns: Namespace = "travel.asia".parse().unwrap();
/// assert_eq!(ns.database(), "travel");
/// assert_eq!(ns.collection(), "asia");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace {
    database: String,
    collection: String,
}

const FORBIDDEN_DATABASE_CHARS: &[char] = &['/', '\\', '.', ' ', '"', '$', '\0'];

impl Namespace {
    /// Create a namespace from its two halves.
    ///
    /// # Errors
    ///
    /// Returns an error if either name is empty or contains characters the
    /// database rejects.
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Result<Self, Error> {
        let database = database.into();
        let collection = collection.into();
        let display = format!("{}.{}", database, collection);

        if database.is_empty() || database.len() > 64 {
            return Err(invalid(&display, "database name must be 1-64 characters"));
        }
        if database.contains(FORBIDDEN_DATABASE_CHARS) {
            return Err(invalid(&display, "database name contains a forbidden character"));
        }
        if collection.is_empty() {
            return Err(invalid(&display, "collection name must not be empty"));
        }
        if collection.contains(['$', '\0', '/', '\\']) {
            return Err(invalid(&display, "collection name contains a forbidden character"));
        }
        if collection.starts_with("system.") {
            return Err(invalid(&display, "system collections are reserved"));
        }

        Ok(Self {
            database,
            collection,
        })
    }

    /// Returns the database name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Returns the collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

fn invalid(value: &str, reason: &str) -> Error {
    InvalidInputError::Namespace {
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

impl FromStr for Namespace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (database, collection) = s
            .split_once('.')
            .ok_or_else(|| invalid(s, "expected 'database.collection'"))?;
        Self::new(database, collection)
    }
}

impl TryFrom<String> for Namespace {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.to_string()
    }
}
