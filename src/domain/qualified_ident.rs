use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use unicode_casefold::UnicodeCaseFold;

/// A dotted SQL name such as `schema.table`, each part already unquoted.
///
/// Equality, hashing and `Ord` are structural. SQL name comparison goes
/// through [`QualifiedIdent::cmp_ignore_case`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct QualifiedIdent {
    parts: Vec<String>,
}

impl QualifiedIdent {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds `prefix.part1.part2...`.
    pub fn with_prefix<I, S>(prefix: &Self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all = prefix.parts.clone();
        all.extend(parts.into_iter().map(Into::into));
        Self { parts: all }
    }

    /// Returns a new name with `part` appended.
    pub fn child(&self, part: impl Into<String>) -> Self {
        let mut parts = self.parts.clone();
        parts.push(part.into());
        Self { parts }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1
    }

    pub fn is_single_qualified(&self) -> bool {
        self.parts.len() == 2
    }

    /// The last part: the table name in `schema.table`.
    pub fn simple_name(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }

    /// The first part of a qualified name; `None` for simple names.
    pub fn first_qualifier(&self) -> Option<&str> {
        if self.parts.len() < 2 {
            return None;
        }
        self.parts.first().map(String::as_str)
    }

    /// The second part of a doubly qualified name (`catalog.schema.table`).
    pub fn second_qualifier(&self) -> Option<&str> {
        if self.parts.len() < 3 {
            return None;
        }
        self.parts.get(1).map(String::as_str)
    }

    pub fn is_prefixed_by(&self, prefix: &Self) -> bool {
        self.parts.starts_with(&prefix.parts)
    }

    /// Case-insensitive, part-by-part; a shorter name sorts first when it is
    /// a prefix of the other.
    pub fn cmp_ignore_case(&self, other: &Self) -> Ordering {
        for (a, b) in self.parts.iter().zip(&other.parts) {
            match cmp_str_ignore_case(a, b) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        self.parts.len().cmp(&other.parts.len())
    }

    pub fn eq_ignore_case(&self, other: &Self) -> bool {
        self.cmp_ignore_case(other) == Ordering::Equal
    }
}

pub(crate) fn cmp_str_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars().case_fold().cmp(b.chars().case_fold())
}

impl fmt::Display for QualifiedIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("."))
    }
}
