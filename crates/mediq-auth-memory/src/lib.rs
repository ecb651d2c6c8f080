//! # mediq-auth-memory
//!
//! In-process backends for the MediQ auth module: a [`MemoryUserStore`]
//! implementing the user record contract and a [`MemoryIdentityProvider`]
//! implementing the identity provider contract with its own opaque tokens.
//!
//! Used for local development and the test suite; production deployments
//! substitute real backends behind the same traits.

pub mod identity;
pub mod user_store;

pub use identity::MemoryIdentityProvider;
pub use user_store::MemoryUserStore;
