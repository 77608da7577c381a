//! Shared types, error model, and configuration for Sensebound.
//!
//! This crate is the foundation depended on by all other Sensebound crates.
//! It provides:
//! - [`SenseboundError`] — the unified error type
//! - Domain types ([`Marker`], [`Breadcrumb`], [`WordEntry`], [`UnmatchedReport`])
//! - Configuration ([`BoundaryMode`] and its environment mapping)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{BoundaryMode, STRICT_BOUNDARY_ENV};
pub use error::{Result, SenseboundError};
pub use types::{
    Breadcrumb, ExampleOut, Extraction, Marker, MatchResult, SenseId, SenseOut, UnmatchedExample,
    UnmatchedReason, UnmatchedReport, WordEntry,
};
