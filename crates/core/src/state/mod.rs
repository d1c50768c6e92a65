//! Client-side state containers.
//!
//! These hold the storefront's in-memory state between API calls: the
//! signed-in principal, the favorites and cart collections, and cached list
//! responses. They are plain single-owner values with no I/O; the client
//! crate drives them from its async API calls.

mod auth;
mod list_cache;
mod toggle;

pub use auth::AuthState;
pub use list_cache::{ListCache, LoadStatus};
pub use toggle::{ToggleCollection, Toggled};

/// An item with a stable identity, compared by id alone.
pub trait Identified {
    /// The identifier type.
    type Id: Copy + Eq + core::fmt::Debug;

    /// This item's identifier.
    fn id(&self) -> Self::Id;
}
