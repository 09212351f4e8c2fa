use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::types::SourceReference;
use crate::config::MIN_OVERSAMPLE;
use crate::sources::{Candidate, SourceError, SourceLookup};

/// Turns a search query into at most `count` retrievable references
///
/// Asks the lookup for `oversample × count` candidates because some hits
/// lack a handle and some will fail to download later.
#[derive(Clone)]
pub struct SourceLocator {
    lookup: Arc<dyn SourceLookup>,
    oversample: usize,
}

impl SourceLocator {
    pub fn new(lookup: Arc<dyn SourceLookup>, oversample: usize) -> Self {
        Self {
            lookup,
            oversample: oversample.max(MIN_OVERSAMPLE),
        }
    }

    /// Number of candidates requested from the lookup for `count` sources
    pub fn candidate_limit(&self, count: usize) -> usize {
        count.saturating_mul(self.oversample)
    }

    pub async fn locate(
        &self,
        query_text: &str,
        count: usize,
    ) -> Result<Vec<SourceReference>, SourceError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let limit = self.candidate_limit(count);
        let candidates = self.lookup.search(query_text, limit).await?;
        debug!(query = query_text, limit, returned = candidates.len(), "Lookup finished");

        let references = select_references(candidates, count);
        info!(
            query = query_text,
            wanted = count,
            located = references.len(),
            "Sources located"
        );
        Ok(references)
    }
}

/// First `count` candidates with a handle, in lookup order, without duplicates
fn select_references(candidates: Vec<Candidate>, count: usize) -> Vec<SourceReference> {
    let mut seen = HashSet::new();

    candidates
        .into_iter()
        .filter_map(|candidate| {
            let url = candidate.handle()?.to_string();
            seen.insert(url.clone()).then(|| SourceReference {
                url,
                id: candidate.id,
                title: candidate.title,
            })
        })
        .take(count)
        .collect()
}
