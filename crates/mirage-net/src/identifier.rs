//! Namespaced identifiers (`namespace:path`) used for every registry entry,
//! tag, item group, and packet channel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Namespace assumed when an identifier is written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Errors produced when parsing an [`Identifier`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// The namespace or path part was empty.
    #[error("identifier `{0}` has an empty namespace or path")]
    Empty(String),
    /// A character outside the allowed set was found.
    #[error("identifier `{input}` contains invalid character {ch:?}")]
    InvalidChar {
        /// The offending input.
        input: String,
        /// The first invalid character.
        ch: char,
    },
}

/// A validated `namespace:path` identifier.
///
/// Serialized on the wire as a single string so the postcard encoding is a
/// varint length followed by UTF-8 bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    full: String,
    split: usize,
}

impl Identifier {
    /// Builds an identifier from separate parts.
    pub fn new(namespace: &str, path: &str) -> Result<Self, IdentifierError> {
        format!("{namespace}:{path}").parse()
    }

    /// Shorthand for an identifier in the default namespace.
    ///
    /// Intended for constant-like call sites; invalid input yields an error
    /// just like [`Identifier::new`].
    pub fn vanilla(path: &str) -> Result<Self, IdentifierError> {
        Self::new(DEFAULT_NAMESPACE, path)
    }

    /// The namespace part.
    pub fn namespace(&self) -> &str {
        &self.full[..self.split]
    }

    /// The path part.
    pub fn path(&self) -> &str {
        &self.full[self.split + 1..]
    }

    /// The full `namespace:path` string.
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

fn valid_namespace_char(ch: char) -> bool {
    matches!(ch, 'a'..='z' | '0'..='9' | '_' | '-' | '.')
}

fn valid_path_char(ch: char) -> bool {
    valid_namespace_char(ch) || ch == '/'
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, path) = s.split_once(':').unwrap_or((DEFAULT_NAMESPACE, s));
        if namespace.is_empty() || path.is_empty() {
            return Err(IdentifierError::Empty(s.to_string()));
        }
        if let Some(ch) = namespace.chars().find(|c| !valid_namespace_char(*c)) {
            return Err(IdentifierError::InvalidChar {
                input: s.to_string(),
                ch,
            });
        }
        if let Some(ch) = path.chars().find(|c| !valid_path_char(*c)) {
            return Err(IdentifierError::InvalidChar {
                input: s.to_string(),
                ch,
            });
        }

        Ok(Self {
            full: format!("{namespace}:{path}"),
            split: namespace.len(),
        })
    }
}

impl TryFrom<String> for Identifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.full
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}
