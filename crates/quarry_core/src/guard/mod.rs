//! Data access guard.
//!
//! # Responsibility
//! - Gate caller-supplied identifiers through table/column allow lists.
//! - Hand out fresh, pre-configured query builders.

pub mod access;
pub mod allow_list;

pub use access::{DataGuard, GuardError, GuardResult};
pub use allow_list::{AllowList, IdentifierKind, WILDCARD};
