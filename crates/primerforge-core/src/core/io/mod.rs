//! Text formats spoken at the edges of the library.
//!
//! - [`boulder`] - the `TAG=VALUE` record format consumed and produced by `primer3_core`.
//! - [`tabular`] - flat CSV export of a [`DesignResult`](crate::core::models::result::DesignResult).

pub mod boulder;
pub mod tabular;
