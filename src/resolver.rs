//! Resort Resolution Module
//!
//! This module matches free-text user input against the resort catalog.
//! Resolution is a pure function of catalog + input: no side effects, no
//! upstream calls. Matching runs in two tiers (exact, then substring) and
//! ties within a tier go to the shortest canonical name, then catalog
//! insertion order.

use crate::catalog::{ResortCatalog, ResortRecord};
use tracing::debug;

/// A successfully resolved resort, borrowing the matched catalog entry
/// for the duration of one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedResort<'c> {
    pub record: &'c ResortRecord,
}

/// Service for resolving user queries against the catalog
pub struct ResortResolver;

impl ResortResolver {
    /// Resolve raw user text to a catalog entry.
    ///
    /// Empty or whitespace-only input never matches. The web layer applies
    /// required-field validation of its own, but the resolver does not
    /// rely on it.
    #[must_use]
    pub fn resolve<'c>(catalog: &'c ResortCatalog, raw_text: &str) -> Option<ResolvedResort<'c>> {
        let query = raw_text.trim().to_lowercase();
        if query.is_empty() {
            debug!("Rejecting empty resort query");
            return None;
        }

        let record = Self::best_match(catalog, &query, Self::matches_exact)
            .or_else(|| Self::best_match(catalog, &query, Self::matches_substring))?;

        debug!(
            "Resolved query {:?} to resort {:?}",
            raw_text, record.canonical_name
        );
        Some(ResolvedResort { record })
    }

    /// Pick the best record among those matching under `predicate`:
    /// shortest canonical name wins, ties go to insertion order.
    fn best_match<'c>(
        catalog: &'c ResortCatalog,
        query: &str,
        predicate: fn(&ResortRecord, &str) -> bool,
    ) -> Option<&'c ResortRecord> {
        catalog
            .records()
            .iter()
            .filter(|record| predicate(record, query))
            .min_by_key(|record| record.canonical_name.len())
    }

    /// Case-insensitive equality against the canonical name or any alias
    fn matches_exact(record: &ResortRecord, query: &str) -> bool {
        record.names().any(|name| name.to_lowercase() == query)
    }

    /// Substring containment in either direction, so "Aspen" finds
    /// "Aspen Snowmass" and "Zermatt Switzerland" still finds "Zermatt"
    fn matches_substring(record: &ResortRecord, query: &str) -> bool {
        record.names().any(|name| {
            let name = name.to_lowercase();
            name.contains(query) || query.contains(&name)
        })
    }
}
