//! Pure ops logic for OpenDominion.
//!
//! This crate contains the numeric model behind espionage operations and
//! spells, independent of any web framework, database, or template layer.
//! Functions take plain dominion snapshots and return results, so the
//! game server can call them per request and the harness can sweep them
//! headless.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Tunable constants (`OpsConfig`) with live-game defaults and validation |
//! | [`dominion`] | Dominion snapshot, op/spell kinds, per-op context |
//! | [`error`] | Error type for the fallible entry points |
//! | [`improvements`] | Castle improvement totals and multiplier curve |
//! | [`land`] | Land types and acreage totals |
//! | [`ops`] | Success chances, casualties, resilience, mastery, spell vulnerability |
//! | [`resolve`] | Rolling an operation against an RNG into an outcome |

pub mod config;
pub mod dominion;
pub mod error;
pub mod improvements;
pub mod land;
pub mod ops;
pub mod resolve;

pub use config::OpsConfig;
pub use dominion::{Discipline, DominionState, OpsContext, SpellKind, SpyOpKind};
pub use error::OpsError;
