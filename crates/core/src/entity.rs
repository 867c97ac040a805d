//! Entity trait: identity + continuity across state changes.

use core::fmt::Debug;
use core::hash::Hash;

/// A persisted record kind.
///
/// `KIND` names the record kind in logs and errors; storage backends may use
/// it as a default table name.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    const KIND: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
