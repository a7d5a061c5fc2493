//! # Site index
//!
//! Static map of the site's own pages (main navigation, broker categories,
//! broker reviews, tools, regional listings) with keywords, used to answer
//! `searchWeb` requests without an external search API.
//!
//! - Loads from JSON (`{"pages": [{"title", "url", "keywords"}]}`).
//! - Falls back to `default_seed()` when the file is missing or invalid.
//! - Scoring: +10 per token found in the title, +5 per keyword/token pair
//!   where either contains the other.

use serde::Deserialize;
use std::{fs, path::Path};

/// Hits returned by `lookup`.
pub const MAX_SITE_HITS: usize = 5;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SitePage {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub score: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteIndex {
    #[serde(default)]
    pub pages: Vec<SitePage>,
}

impl Default for SiteIndex {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl SiteIndex {
    /// Load from a JSON file. Falls back to `default_seed()` on error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(error = %e, path = %path.display(), "invalid site index, using seed");
                Self::default_seed()
            }),
            Err(_) => Self::default_seed(),
        }
    }

    /// Score pages against query tokens and return the best `MAX_SITE_HITS`.
    pub fn lookup(&self, tokens: &[String]) -> Vec<SiteHit> {
        let mut hits: Vec<SiteHit> = self
            .pages
            .iter()
            .filter_map(|page| {
                let score = page_score(page, tokens);
                (score > 0).then(|| SiteHit {
                    title: page.title.clone(),
                    url: page.url.clone(),
                    snippet: format!("{} - Find detailed information and reviews.", page.title),
                    score,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(MAX_SITE_HITS);
        hits
    }

    /// Built-in page list mirroring the site's navigation.
    pub fn default_seed() -> Self {
        let groups: &[&[(&str, &str, &[&str])]] = &[
            // main pages
            &[
                ("Homepage", "/landing", &["home", "main", "start", "welcome"]),
                ("Best Brokers", "/best-brokers", &["best", "top", "recommended", "brokers"]),
                ("Broker Comparison", "/tools/compare", &["compare", "comparison", "vs", "versus"]),
                ("Trading Tools", "/tools", &["tools", "calculator", "converter", "quiz"]),
                ("FAQ", "/faq", &["faq", "questions", "help", "support"]),
                ("About Us", "/about", &["about", "company", "team", "contact"]),
            ],
            // broker categories
            &[
                ("Best Forex Brokers", "/best-brokers/forex", &["forex", "fx", "currency", "foreign exchange"]),
                ("Best Brokers for Beginners", "/best-brokers/beginners", &["beginner", "new", "starter", "novice", "first time"]),
                ("Low-Cost Brokers", "/best-brokers/low-cost", &["low cost", "cheap", "affordable", "low fees", "commission free"]),
                ("Crypto Brokers", "/best-brokers/crypto", &["crypto", "cryptocurrency", "bitcoin", "ethereum", "digital currency"]),
                ("Stock Brokers", "/best-brokers/stocks", &["stocks", "shares", "equity", "stock market"]),
                ("CFD Brokers", "/best-brokers/cfd", &["cfd", "contract for difference", "derivatives"]),
                ("Day Trading Brokers", "/best-brokers/day-trading", &["day trading", "scalping", "short term"]),
                ("Swing Trading Brokers", "/best-brokers/swing-trading", &["swing trading", "medium term", "position trading"]),
                ("Mobile Trading Apps", "/best-brokers/mobile-trading", &["mobile", "app", "smartphone", "tablet"]),
                ("High Leverage Brokers", "/best-brokers/high-leverage", &["leverage", "margin", "high leverage"]),
                ("ECN Brokers", "/best-brokers/ecn", &["ecn", "electronic communication network", "direct market access"]),
                ("Islamic Brokers", "/best-brokers/islamic", &["islamic", "sharia", "swap free", "halal"]),
                ("Professional Brokers", "/best-brokers/professional", &["professional", "advanced", "institutional"]),
                ("Demo Account Brokers", "/best-brokers/demo-accounts", &["demo", "practice", "trial", "test account"]),
            ],
            // broker reviews
            &[
                ("eToro Review", "/broker/805f65c5-3911-448e-8800-0143bbbb2a0f", &["etoro", "social trading", "copy trading"]),
                ("XM Review", "/brokers/xm", &["xm", "xm group", "xm global"]),
                ("IC Markets Review", "/brokers/ic-markets", &["ic markets", "ic", "raw spread"]),
                ("Pepperstone Review", "/brokers/pepperstone", &["pepperstone", "razor"]),
                ("OANDA Review", "/brokers/oanda", &["oanda", "oanda corporation"]),
                ("Interactive Brokers Review", "/brokers/interactive-brokers", &["interactive brokers", "ibkr", "ib"]),
                ("Plus500 Review", "/brokers/plus500", &["plus500", "plus 500"]),
                ("Capital.com Review", "/brokers/capital-com", &["capital.com", "capital", "capitalcom"]),
                ("Saxo Bank Review", "/brokers/saxo-bank", &["saxo", "saxo bank"]),
                ("Swissquote Review", "/brokers/swissquote", &["swissquote", "swiss"]),
                ("FXTM Review", "/brokers/fxtm", &["fxtm", "forextime"]),
                ("Exness Review", "/brokers/exness", &["exness"]),
                ("Axi Review", "/brokers/axi", &["axi", "axitrader"]),
                ("EasyMarkets Review", "/brokers/easymarkets", &["easymarkets", "easy markets"]),
                ("TMGM Review", "/brokers/tmgm", &["tmgm", "trademax"]),
                ("XTB Review", "/brokers/xtb", &["xtb", "x-trade brokers"]),
                ("StarTrader Review", "/brokers/startrader", &["startrader", "star trader"]),
            ],
            // tools
            &[
                ("Broker Comparison Tool", "/tools/compare", &["compare", "comparison", "side by side", "vs"]),
                ("Trading Calculator", "/tools/calculator", &["calculator", "calculate", "pip", "profit", "loss"]),
                ("Currency Converter", "/tools/converter", &["converter", "convert", "currency", "exchange rate"]),
                ("Broker Finder Quiz", "/tools/quiz", &["quiz", "finder", "find broker", "questionnaire"]),
                ("Scam Check Tool", "/tools/scam-check", &["scam", "verify", "check", "legitimate", "fraud"]),
            ],
            // regions
            &[
                ("Best Brokers in UK", "/best-brokers/uk", &["uk", "united kingdom", "britain", "british"]),
                ("Best Brokers in US", "/best-brokers/us", &["us", "usa", "united states", "america", "american"]),
                ("Best Brokers in Europe", "/best-brokers/europe", &["europe", "european", "eu"]),
                ("Best Brokers in Australia", "/best-brokers/australia", &["australia", "australian", "aussie"]),
                ("Best Brokers in Canada", "/best-brokers/canada", &["canada", "canadian"]),
                ("Best Brokers in Asia", "/best-brokers/asia", &["asia", "asian"]),
                ("Best Brokers in Singapore", "/best-brokers/singapore", &["singapore"]),
                ("Best Brokers in India", "/best-brokers/india", &["india", "indian"]),
            ],
        ];

        let pages = groups
            .iter()
            .flat_map(|g| g.iter())
            .map(|(title, url, kws)| SitePage {
                title: title.to_string(),
                url: url.to_string(),
                keywords: kws.iter().map(|k| k.to_string()).collect(),
            })
            .collect();
        Self { pages }
    }
}

fn page_score(page: &SitePage, tokens: &[String]) -> u32 {
    let title = page.title.to_lowercase();
    let mut score = 0u32;
    for t in tokens {
        let t = t.to_lowercase();
        if title.contains(&t) {
            score += 10;
        }
        for kw in &page.keywords {
            let kw = kw.to_lowercase();
            if kw.contains(&t) || t.contains(&kw) {
                score += 5;
            }
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn title_match_outweighs_keyword_match() {
        let idx = SiteIndex::default_seed();
        let hits = idx.lookup(&toks(&["crypto"]));
        assert_eq!(hits[0].url, "/best-brokers/crypto");
        assert!(hits[0].score >= 15);
    }

    #[test]
    fn no_match_returns_empty() {
        let idx = SiteIndex::default_seed();
        assert!(idx.lookup(&toks(&["zzzzzz"])).is_empty());
        assert!(idx.lookup(&[]).is_empty());
    }

    #[test]
    fn results_are_capped_and_sorted() {
        let idx = SiteIndex::default_seed();
        let hits = idx.lookup(&toks(&["brokers", "best"]));
        assert_eq!(hits.len(), MAX_SITE_HITS);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn seed_lists_every_site_page() {
        let idx = SiteIndex::default_seed();
        assert_eq!(idx.pages.len(), 50);
        for url in [
            "/best-brokers/asia",
            "/brokers/easymarkets",
            "/brokers/tmgm",
            "/brokers/startrader",
            "/broker/805f65c5-3911-448e-8800-0143bbbb2a0f",
        ] {
            assert!(idx.pages.iter().any(|p| p.url == url), "missing {url}");
        }
        let hits = idx.lookup(&toks(&["asian"]));
        assert_eq!(hits[0].url, "/best-brokers/asia");
    }

    #[test]
    fn missing_file_falls_back_to_seed() {
        let idx = SiteIndex::load_from_file("does/not/exist.json");
        assert_eq!(idx.pages.len(), SiteIndex::default_seed().pages.len());
    }

    #[test]
    fn custom_index_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("site.json");
        fs::write(
            &p,
            r#"{"pages": [{"title": "Swap Calculator", "url": "/tools/swap", "keywords": ["swap", "rollover"]}]}"#,
        )
        .unwrap();
        let idx = SiteIndex::load_from_file(&p);
        let hits = idx.lookup(&toks(&["rollover"]));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].snippet, "Swap Calculator - Find detailed information and reviews.");
    }
}
