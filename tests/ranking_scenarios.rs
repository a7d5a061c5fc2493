// tests/ranking_scenarios.rs
//
// End-to-end answer scenarios over an in-memory catalog: ranking order,
// truncation, grouping and determinism of the rendered reply.

use std::path::PathBuf;
use std::sync::Arc;

use roku_assistant::config::SearchSettings;
use roku_assistant::content::ContentType;
use roku_assistant::search::{tokenize, Assistant, ChatQuery, SiteIndex};
use roku_assistant::store::{Catalog, CatalogStore, CollectionLimits};

fn assistant_from_json(json: &str) -> Assistant {
    let catalog = Catalog::from_json_str(json).expect("catalog json");
    Assistant::new(
        Arc::new(CatalogStore::new(catalog, CollectionLimits::default())),
        SiteIndex::default_seed(),
        SearchSettings::default(),
    )
}

fn sample_assistant() -> Assistant {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/catalog.json");
    let catalog = Catalog::load_from_file(&path).expect("sample catalog");
    Assistant::new(
        Arc::new(CatalogStore::new(catalog, CollectionLimits::default())),
        SiteIndex::default_seed(),
        SearchSettings::default(),
    )
}

/// Four blog posts and four pages that all mention "spreads", no dates.
const SPREADS: &str = r#"{
    "blog_posts": [
        {"id": 1, "url": "/blog/a", "title": "Spreads A", "content": "spreads"},
        {"id": 2, "url": "/blog/b", "title": "Spreads B", "content": "spreads"},
        {"id": 3, "url": "/blog/c", "title": "Spreads C", "content": "spreads"},
        {"id": 4, "url": "/blog/d", "title": "Spreads D", "content": "spreads"}
    ],
    "pages": [
        {"id": 5, "url": "/p/a", "title": "Page A", "content": "raw spreads"},
        {"id": 6, "url": "/p/b", "title": "Page B", "content": "raw spreads"},
        {"id": 7, "url": "/p/c", "title": "Page C", "content": "raw spreads"},
        {"id": 8, "url": "/p/d", "title": "Page D", "content": "raw spreads"}
    ]
}"#;

fn link_lines(reply: &str) -> usize {
    reply.lines().filter(|l| l.starts_with("- [")).count()
}

#[tokio::test]
async fn leverage_question_puts_faq_at_or_above_broker() {
    let assistant = sample_assistant();
    let tokens = tokenize("what is leverage");
    assert_eq!(tokens, vec!["what", "leverage"]);

    let ranked = assistant.ranked(&tokens).await;
    let faq = ranked
        .iter()
        .position(|it| it.kind == ContentType::Faq && it.title.contains("leverage"))
        .expect("leverage faq in top results");
    if let Some(broker) = ranked.iter().position(|it| it.kind == ContentType::Broker) {
        assert!(faq <= broker, "faq at {faq}, broker at {broker}");
    }
}

#[tokio::test]
async fn reply_holds_exactly_top_five() {
    let assistant = assistant_from_json(SPREADS);
    let ranked = assistant.ranked(&tokenize("tight spreads")).await;
    assert_eq!(ranked.len(), 5);

    let reply = assistant.reply(&ChatQuery::new("tight spreads")).await;
    assert_eq!(link_lines(&reply), 5, "{reply}");
}

#[tokio::test]
async fn equal_scores_keep_fetch_order() {
    let assistant = assistant_from_json(SPREADS);
    let ranked = assistant.ranked(&tokenize("spreads")).await;
    let urls: Vec<&str> = ranked.iter().map(|it| it.url.as_str()).collect();
    assert_eq!(urls, vec!["/blog/a", "/blog/b", "/blog/c", "/blog/d", "/p/a"]);
}

#[tokio::test]
async fn exact_title_beats_more_matches() {
    let assistant = assistant_from_json(
        r#"{
            "blog_posts": [
                {"id": "b1", "url": "/blog/risk", "title": "Managing margin risk",
                 "content": "leverage margin risk", "tags": "leverage,margin,risk"}
            ],
            "faqs": [
                {"id": "f1", "question": "Leverage", "answer": "Borrowed exposure."}
            ]
        }"#,
    );
    let ranked = assistant.ranked(&tokenize("leverage margin risk")).await;
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].title, "Leverage");
    assert_eq!(ranked[1].url, "/blog/risk");
}

#[tokio::test]
async fn sections_appear_once_in_display_order() {
    let assistant = sample_assistant();
    let reply = assistant
        .reply(&ChatQuery::new("leverage brokers trading"))
        .await;

    let mut last = 0;
    for kind in ContentType::DISPLAY_ORDER {
        let heading = format!("### {}", kind.label());
        let hits: Vec<_> = reply.match_indices(&heading).collect();
        assert!(hits.len() <= 1, "duplicate section {heading}");
        if let Some((at, _)) = hits.first() {
            assert!(*at >= last, "{heading} out of order");
            last = *at;
        }
    }
    assert!(last > 0, "expected at least one section: {reply}");
}

#[tokio::test]
async fn same_message_same_reply() {
    let query = ChatQuery {
        message: "best ecn broker for scalping".into(),
        search_web: true,
    };
    let a = sample_assistant().reply(&query).await;
    let b = sample_assistant().reply(&query).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn web_section_only_when_requested() {
    let assistant = sample_assistant();
    let plain = assistant.reply(&ChatQuery::new("leverage explained")).await;
    assert!(!plain.contains("### Web Search Results"));

    let with_web = assistant
        .reply(&ChatQuery {
            message: "leverage explained".into(),
            search_web: true,
        })
        .await;
    assert!(with_web.contains("### Web Search Results"), "{with_web}");
    assert!(with_web.contains("/best-brokers/high-leverage"));
}
