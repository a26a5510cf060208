//! Identifier allow lists.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Name list entry meaning "no restriction".
pub const WILDCARD: &str = "*";

/// Permission set for table or column identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowList {
    #[default]
    Unrestricted,
    RestrictedTo(BTreeSet<String>),
}

impl AllowList {
    /// Builds an allow list from raw names.
    ///
    /// Blank entries are ignored. No names, or exactly the single entry `*`,
    /// yields [`AllowList::Unrestricted`].
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect::<BTreeSet<_>>();

        if names.is_empty() || (names.len() == 1 && names.contains(WILDCARD)) {
            Self::Unrestricted
        } else {
            Self::RestrictedTo(names)
        }
    }

    pub fn permits(&self, name: &str) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::RestrictedTo(names) => names.contains(name),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }
}

/// Kind of identifier checked against an allow list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Table,
    Column,
}

impl Display for IdentifierKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Column => write!(f, "column"),
        }
    }
}
