use std::collections::HashSet;

use serde::Serialize;

use super::domain::Posting;
use super::store::IdentifierSets;

pub const DEFAULT_PURGE_THRESHOLD: usize = 3;

/// Flags when persisted identifiers far outnumber the postings still being
/// returned upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeAdvisor {
    threshold: usize,
}

impl PurgeAdvisor {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn should_offer_purge(&self, stored_ids: usize, live_postings: usize) -> bool {
        stored_ids > live_postings.saturating_mul(self.threshold)
    }

    pub fn assess(&self, sets: &IdentifierSets, live: &[Posting]) -> PurgeAdvice {
        let stored_ids = sets.len();
        let live_postings = live.len();
        let live_ids: HashSet<&str> = live.iter().map(|posting| posting.id.as_str()).collect();
        let stale_ids = sets
            .all_ids()
            .into_iter()
            .filter(|id| !live_ids.contains(id))
            .count();

        PurgeAdvice {
            stored_ids,
            live_postings,
            stale_ids,
            threshold: self.threshold,
            purge_recommended: self.should_offer_purge(stored_ids, live_postings),
        }
    }
}

impl Default for PurgeAdvisor {
    fn default() -> Self {
        Self::new(DEFAULT_PURGE_THRESHOLD)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurgeAdvice {
    pub stored_ids: usize,
    pub live_postings: usize,
    pub stale_ids: usize,
    pub threshold: usize,
    pub purge_recommended: bool,
}

/// Drops every persisted identifier that is not among `live`. Returns the
/// trimmed sets and how many identifiers were removed.
pub fn purge_unused(sets: &IdentifierSets, live: &[Posting]) -> (IdentifierSets, usize) {
    let live_ids: HashSet<&str> = live.iter().map(|posting| posting.id.as_str()).collect();
    let kept = sets.retained(&live_ids);
    let dropped = sets.len() - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::triage::domain::Category;

    fn posting(id: &str) -> Posting {
        Posting {
            id: id.to_string(),
            title: format!("Role {id}"),
            redirect_url: String::new(),
            company: Default::default(),
            location: Default::default(),
            description: String::new(),
            created: None,
            contract_type: None,
        }
    }

    #[test]
    fn purge_is_offered_only_past_the_ratio() {
        let advisor = PurgeAdvisor::new(3);
        assert!(!advisor.should_offer_purge(0, 0));
        assert!(!advisor.should_offer_purge(30, 10));
        assert!(advisor.should_offer_purge(31, 10));
        assert!(advisor.should_offer_purge(1, 0));
    }

    #[test]
    fn saturating_threshold_never_overflows() {
        let advisor = PurgeAdvisor::new(usize::MAX);
        assert!(!advisor.should_offer_purge(usize::MAX, 2));
    }

    #[test]
    fn assess_counts_stale_identifiers() {
        let sets = IdentifierSets::default()
            .moved(Category::Saved, "a")
            .moved(Category::Archived, "gone-1")
            .moved(Category::Applied, "gone-2");
        let advice = PurgeAdvisor::new(1).assess(&sets, &[posting("a"), posting("b")]);

        assert_eq!(advice.stored_ids, 3);
        assert_eq!(advice.live_postings, 2);
        assert_eq!(advice.stale_ids, 2);
        assert!(advice.purge_recommended);
    }

    #[test]
    fn purge_unused_keeps_only_live_identifiers() {
        let sets = IdentifierSets::default()
            .moved(Category::Saved, "a")
            .moved(Category::Archived, "gone")
            .moved(Category::Applied, "b");

        let (kept, dropped) = purge_unused(&sets, &[posting("a"), posting("b"), posting("c")]);

        assert_eq!(dropped, 1);
        assert_eq!(kept.category_of("a"), Category::Saved);
        assert_eq!(kept.category_of("b"), Category::Applied);
        assert_eq!(kept.category_of("gone"), Category::New);
    }
}
