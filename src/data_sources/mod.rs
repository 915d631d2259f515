//! External data sources for contribution history.
//!
//! This module provides the client for fetching per-user contribution
//! listings from a MediaWiki installation, plus the retry machinery the
//! roster loop runs it through.
//!
//! # Data Sources
//!
//! - [`wikidata`]: the Wikidata `action=query&list=usercontribs` API

pub mod wikidata;

pub use wikidata::{ContributionSource, FetchError, RetryPolicy, WikidataClient, fetch_with_retry};
