//! # PrimerForge Core Library
//!
//! PCR primer design exposed as a callable library, built on top of the primer3
//! design engine. The engine itself is treated as an opaque collaborator: this crate
//! prepares its inputs, normalizes its outputs, and owns the constraint-relaxation
//! retry policy used when a design attempt comes back empty.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`PrimerPair`, `DesignResult`),
//!   the `[n]` target-marker parser, and I/O codecs (Boulder-IO, CSV tables).
//!
//! - **[`engine`]: The Engine Boundary.** The parameter builder that turns named
//!   constraints into a validated `DesignParameters` bundle, the `DesignEngine` trait
//!   that every backend implements, and the `Primer3Engine` subprocess adapter.
//!
//! - **[`workflows`]: The Public API.** The plain `design` entry point, the
//!   `troubleshoot` relaxation state machine, and the stateless `PrimerDesigner`
//!   service object that ties them to a concrete engine.

pub mod core;
pub mod engine;
pub mod workflows;

pub use workflows::{DesignError, ErrorKind, PrimerDesigner};
