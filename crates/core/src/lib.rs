#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Requisition Planner.
//!
//! This crate hosts the data models, configuration handling, catalog
//! loading, loadout selection rules, and persistence layers used by the
//! terminal UI and any future frontends.

pub mod catalog;
pub mod config;
pub mod export;
pub mod metadata;
pub mod models;
pub mod selection;
pub mod sort;

pub use catalog::{Catalog, CatalogError};
pub use config::AppConfig;
pub use metadata::{Metadata, MetadataError, MetadataStore};
pub use models::{Category, Item};
pub use selection::{Reject, Selection, SelectionError, Totals};
pub use sort::{SortColumn, SortState};
