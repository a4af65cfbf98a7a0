//! # Engine Module
//!
//! The boundary between PrimerForge and the external primer-design engine.
//!
//! - **Configuration** ([`config`]) - `DesignParameters`, the builder that validates
//!   caller overrides against the documented defaults, and engine-level settings.
//! - **Backend contract** ([`backend`]) - the `DesignEngine` trait and the
//!   pairs / no-pairs outcome every backend must report.
//! - **primer3 adapter** ([`primer3`]) - runs `primer3_core` over Boulder-IO.
//! - **Progress Monitoring** ([`progress`]) - callback-based attempt reporting.
//! - **Error Handling** ([`error`]) - engine faults, kept apart from "no pairs".

pub mod backend;
pub mod config;
pub mod error;
pub mod primer3;
pub mod progress;
