//! Storage layer: the document store behind remote sync.
//!
//! # Modules
//!
//! - `backend`: [`DocumentStore`] trait, the boundary the sync worker drives
//! - `json`: JSON file implementation, one collection per user
//! - `models`: Wire record and change-feed types, separate from domain models

pub mod backend;
pub mod json;
pub mod models;

pub use backend::DocumentStore;
pub use json::JsonStore;
pub use models::{DocumentChange, ItemDocument};
