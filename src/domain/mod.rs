//! Shared data model layer (structs/constants only).
//!
//! ## Purpose
//! - Keep input, score, certification and ledger types in one place.
//! - Avoid cyclic imports and duplicated type definitions.
//! - Make artifact schema changes explicit and reviewable.
//!
//! ## Files
//! - `models.rs`: report input, derived results, ledger/output structs.
//! - `constants.rs`: protocol version, absence phrases, EVID caps, genesis hash.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem side effects.
//!
//! ## Compatibility note
//! Field names and ordering here are what downstream consumers read from the
//! five run artifacts. Keep schema-impacting changes synchronized with
//! `docs/contracts/*`.

pub mod constants;
pub mod models;
