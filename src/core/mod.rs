//! core
//!
//! Core domain types, policies and settings for shipyard.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchVersion, OwnerKind, RepoRecord, etc.
//! - [`version`] - Version and working-branch policy
//! - [`manifest`] - Project manifest access
//! - [`config`] - Settings schema and loading
//! - [`paths`] - Per-user storage locations
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Policies are pure functions over their inputs
//! - Settings are strict and self-describing

pub mod config;
pub mod manifest;
pub mod paths;
pub mod types;
pub mod version;
