//! moji-export: export saved items from a MOJi dictionary account
//!
//! The remote collection API clamps how deep any single `(folder, sortType, targetTypes)`
//! view can be paged. This crate walks many overlapping views, detects the clamp, and
//! reconciles the pages into one deduplicated collection that is persisted after every
//! page so long exports can be inspected while they run.

pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod index;
pub mod render;
pub mod scope;
pub mod sink;
pub mod walker;

pub use engine::{run_export, ExportReport, ReconcileOptions, Reconciler};
pub use error::ExportError;
