//! forge
//!
//! Abstraction for source hosting platforms (GitHub, Gitee).
//!
//! # Architecture
//!
//! The `Forge` trait defines the interface for interacting with remote
//! hosting platforms. The release engine uses the [`create_forge`] factory
//! function rather than importing specific implementations directly.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and payload types
//! - [`github`]: GitHub implementation
//! - [`gitee`]: Gitee implementation
//! - `rest`: Shared bearer-authenticated JSON client
//! - [`mock`]: Mock implementation for deterministic testing
//! - `factory`: Forge selection and creation

mod factory;
pub mod gitee;
pub mod github;
pub mod mock;
mod rest;
mod traits;

pub use factory::{create_forge, valid_forge_names, ForgeProvider};
pub use traits::*;
