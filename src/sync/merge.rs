//! Merge helpers for folding a server snapshot into local state.

use std::collections::HashSet;

use crate::core::{CategorySet, Quote};

use super::config::MergePolicy;

/// Append remote quotes to `local` per `policy`, extending `categories`.
///
/// Returns the number of quotes appended.
pub fn merge_remote(
    local: &mut Vec<Quote>,
    categories: &mut CategorySet,
    remote: &[Quote],
    policy: MergePolicy,
) -> usize {
    let before = local.len();
    match policy {
        MergePolicy::Append => local.extend_from_slice(remote),
        MergePolicy::SkipExisting => {
            let mut seen: HashSet<Quote> = local.iter().cloned().collect();
            for quote in remote {
                if seen.insert(quote.clone()) {
                    local.push(quote.clone());
                }
            }
        }
    }
    let added = &local[before..];
    categories.extend_from(added);
    added.len()
}

/// Replace local quotes and categories with exactly `server`.
pub fn overwrite_with(local: &mut Vec<Quote>, categories: &mut CategorySet, server: Vec<Quote>) {
    *categories = CategorySet::from_quotes(&server);
    *local = server;
}
