//! Orchard client library.
//!
//! [`ApiClient`] is a thin typed wrapper over the REST API. [`Storefront`]
//! layers the storefront's session state on top of it: the signed-in
//! principal, favorites, cart, and cached blog and product lists.
//!
//! # Example
//!
//! ```rust,ignore
//! use orchard_client::{ApiClient, Storefront};
//!
//! let mut shop = Storefront::new(ApiClient::new("http://localhost:5000")?);
//! shop.refresh_products().await?;
//! if let Some(product) = shop.products().items().first() {
//!     shop.toggle_cart(product);
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod api;
mod error;
mod storefront;

pub use api::{ApiClient, ImageUpload};
pub use error::ClientError;
pub use storefront::{ALL_CATEGORIES, Storefront};
