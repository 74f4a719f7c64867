//! Sync and presentation-state module for the SISCOM travel-alert dashboard.
//!
//! Keeps an in-memory alert collection consistent with the REST source under
//! periodic polling, projects it through the list view's filters, and manages
//! the selection-driven detail overlay with its asynchronously resolved
//! driving route. The rendering surface is the host's concern; this crate
//! owns the state it renders from.

pub mod api;
pub mod config;
pub mod error;
pub mod maps;
pub mod models;
pub mod overlay;
pub mod projection;
pub mod sync;
