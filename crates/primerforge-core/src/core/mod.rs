//! Stateless foundation types: result models, sequence parsing, and file formats.

pub mod io;
pub mod models;
pub mod sequence;
