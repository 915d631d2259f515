//! Wikitally - tallies the Wikidata contributions of editathon participants.
//!
//! # Overview
//!
//! Given a roster of participants (account names, plus `IP@<prefix>`
//! markers for anonymous editors) and a time window, Wikitally polls the
//! Wikidata `usercontribs` API for each participant, classifies every
//! contribution by edit-action kind and language, and writes two
//! plain-text reports: a per-contribution detail log and a global
//! summary of the run's totals.
//!
//! The pipeline is a strictly sequential batch: one participant is fully
//! fetched and classified before the next begins, and transient API
//! failures are retried rather than surfaced.
//!
//! # Modules
//!
//! - [`model`]: participants, time windows, contributions, taxonomies
//! - [`data_sources`]: the `usercontribs` client and retry machinery
//! - [`aggregation`]: classification and the run's accumulator
//! - [`report`]: append-only plain-text report sinks
//! - [`roster`]: participant list loading
//! - [`analyzer`]: the roster loop tying it all together

pub mod aggregation;
pub mod analyzer;
pub mod data_sources;
pub mod model;
pub mod report;
pub mod roster;
