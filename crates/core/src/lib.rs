//! Orchard Core - Shared types library.
//!
//! This crate provides common types used across all Orchard components:
//! - `api` - REST API backend for the storefront and blog
//! - `client` - Typed API client and client-side session state
//! - `cli` - Command-line tools for migrations, provisioning and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure state machines - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used on both sides of the wire.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and roles
//! - [`models`] - Request and response bodies shared by the API and its clients
//! - [`state`] - Client-side containers (auth, toggle collections, list caches)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod state;
pub mod types;

pub use types::*;
