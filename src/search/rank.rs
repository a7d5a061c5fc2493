//! Relevance ranking over normalized content.
//!
//! Ordering key, highest first:
//! 1. title equals one of the tokens (case-insensitive),
//! 2. number of distinct tokens found as a substring in any searchable field.
//!
//! The sort is stable, so equal keys keep fetch order.

use crate::content::ContentItem;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Default number of items kept after ranking.
pub const DEFAULT_TOP_K: usize = 5;

/// Per-item relevance against a token list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Relevance {
    pub match_count: usize,
    pub exact_title: bool,
}

impl Relevance {
    fn cmp_desc(&self, other: &Self) -> Ordering {
        other
            .exact_title
            .cmp(&self.exact_title)
            .then_with(|| other.match_count.cmp(&self.match_count))
    }
}

fn distinct(tokens: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn score_lowered(item: &ContentItem, tokens: &[String]) -> Relevance {
    let fields: Vec<String> = item
        .searchable_fields()
        .iter()
        .map(|f| f.to_lowercase())
        .collect();
    let title = &fields[0];

    let match_count = tokens
        .iter()
        .filter(|t| fields.iter().any(|f| f.contains(t.as_str())))
        .count();
    let exact_title = tokens.iter().any(|t| title == t);

    Relevance {
        match_count,
        exact_title,
    }
}

/// Score a single item. Tokens are lowercased and deduplicated here, so a
/// repeated query word still counts once.
pub fn score(item: &ContentItem, tokens: &[String]) -> Relevance {
    score_lowered(item, &distinct(tokens))
}

/// Rank items by relevance (see module docs) and keep the first `top_k`.
pub fn rank(items: Vec<ContentItem>, tokens: &[String], top_k: usize) -> Vec<ContentItem> {
    let tokens = distinct(tokens);
    let mut scored: Vec<(Relevance, ContentItem)> = items
        .into_iter()
        .map(|it| (score_lowered(&it, &tokens), it))
        .collect();

    // `sort_by` is stable
    scored.sort_by(|a, b| a.0.cmp_desc(&b.0));

    scored
        .into_iter()
        .take(top_k)
        .map(|(_, it)| it)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{normalize, BlogRecord, BrokerRecord, FaqRecord, SourceRecord};

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn faq(id: &str, q: &str, a: &str) -> ContentItem {
        normalize(SourceRecord::Faq(FaqRecord {
            id: id.into(),
            question: q.into(),
            answer: a.into(),
            category: None,
        }))
    }

    fn broker(id: &str, name: &str, desc: &str) -> ContentItem {
        normalize(SourceRecord::Broker(BrokerRecord {
            id: id.into(),
            name: name.into(),
            description: Some(desc.into()),
            ..Default::default()
        }))
    }

    #[test]
    fn token_counts_once_across_fields() {
        let item = normalize(SourceRecord::Blog(BlogRecord {
            id: "1".into(),
            title: "Leverage explained".into(),
            content: "leverage leverage".into(),
            tags: Some("leverage,margin".into()),
            ..Default::default()
        }));
        let r = score(&item, &toks(&["leverage", "leverage", "margin", "swap"]));
        assert_eq!(r.match_count, 2);
        assert!(!r.exact_title);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let item = broker("1", "Pepperstone", "Razor ACCOUNT with raw spreads");
        let r = score(&item, &toks(&["account", "PEPPERSTONE"]));
        assert_eq!(r.match_count, 2);
        assert!(r.exact_title);
    }

    #[test]
    fn exact_title_beats_higher_match_count() {
        let rich = faq("1", "Forex fees and spreads", "forex spreads fees compared");
        let exact = broker("2", "Spreads", "");
        let ranked = rank(
            vec![rich, exact],
            &toks(&["forex", "spreads", "fees"]),
            DEFAULT_TOP_K,
        );
        assert_eq!(ranked[0].title, "Spreads");
        assert_eq!(ranked[1].title, "Forex fees and spreads");
    }

    #[test]
    fn higher_match_count_first_without_exact_title() {
        let one = broker("1", "XM", "offers leverage");
        let two = faq("2", "What is leverage in forex trading?", "Leverage lets you...");
        let ranked = rank(vec![one, two], &toks(&["what", "leverage"]), DEFAULT_TOP_K);
        assert_eq!(ranked[0].kind, crate::content::ContentType::Faq);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let items: Vec<ContentItem> = (0..8)
            .map(|i| faq(&i.to_string(), &format!("Question {i} about swaps"), ""))
            .collect();
        let ranked = rank(items, &toks(&["swaps"]), 8);
        let ids: Vec<_> = ranked.iter().map(|it| it.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4", "5", "6", "7"]);
    }

    #[test]
    fn truncates_to_top_k() {
        let items: Vec<ContentItem> = (0..9)
            .map(|i| faq(&i.to_string(), "margin call", ""))
            .collect();
        assert_eq!(rank(items, &toks(&["margin"]), DEFAULT_TOP_K).len(), 5);
    }

    #[test]
    fn non_matching_items_are_kept_but_sorted_last() {
        let miss = broker("1", "Plus500", "CFD provider");
        let hit = broker("2", "OANDA", "forex pioneer");
        let ranked = rank(vec![miss, hit], &toks(&["forex"]), DEFAULT_TOP_K);
        assert_eq!(ranked[0].title, "OANDA");
        assert_eq!(ranked.len(), 2);
    }
}
