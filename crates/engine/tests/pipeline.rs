//! End-to-end pipeline tests against a seeded SQLite file and a fake generator.

use copilot_core::AppError;
use copilot_engine::{Copilot, Intent, Router};
use copilot_knowledge::embeddings::providers::TrigramProvider;
use copilot_knowledge::{KnowledgeEntry, Retriever};
use copilot_llm::{LlmClient, MockClient, RetryPolicy, RetryingClient};
use copilot_prompt::Evidence;
use copilot_sql::{seed_database, SqlGatherer, SqliteStore, DEFAULT_SEED};
use std::sync::Arc;
use tempfile::TempDir;

const STRUCTURED_ANSWER: &str = "### Summary\nEarly High-Risk subscribers dominate.\n\n\
### Data Evidence\n- churn_probability up to 0.9\n\n\
### Strategic Recommendation\nOffer contract upgrades.";

struct Fixture {
    _dir: TempDir,
    copilot: Copilot,
    classifier: Arc<MockClient>,
    generator: Arc<MockClient>,
}

fn corpus() -> Vec<KnowledgeEntry> {
    vec![
        KnowledgeEntry::new(
            "Segment Analysis: Early High-Risk",
            "Early High-Risk subscribers average 58% churn probability within their first year.",
        ),
        KnowledgeEntry::new(
            "Retention Strategies for At-Risk Customers",
            "Reduce churn among at-risk customers with contract upgrade incentives and bundles.",
        ),
        KnowledgeEntry::new(
            "Pricing Sensitivity Insight",
            "Subscribers paying above 75 per month react strongly to price increases.",
        ),
        KnowledgeEntry::new(
            "Network Quality",
            "Coverage gaps and dropped calls drive complaints in rural areas.",
        ),
    ]
}

async fn fixture(classifier: MockClient, generator: Arc<dyn LlmClient>) -> (TempDir, Copilot, Arc<MockClient>) {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("subscriber_sample.db");
    seed_database(&db, DEFAULT_SEED).unwrap();

    let classifier = Arc::new(classifier);
    let retriever = Retriever::build(corpus(), Arc::new(TrigramProvider::new(384)), 3)
        .await
        .unwrap();

    let copilot = Copilot::new(
        Router::new(classifier.clone(), "test-model"),
        SqlGatherer::new(Arc::new(SqliteStore::new(&db))),
        retriever,
        generator,
        "test-model",
    );

    (dir, copilot, classifier)
}

async fn standard(answer: &str) -> Fixture {
    let generator = Arc::new(MockClient::replying(answer));
    let (dir, copilot, classifier) =
        fixture(MockClient::replying("rag"), generator.clone()).await;
    Fixture {
        _dir: dir,
        copilot,
        classifier,
        generator,
    }
}

#[tokio::test]
async fn test_structured_question_uses_sql_evidence() {
    let f = standard(STRUCTURED_ANSWER).await;

    let answer = f.copilot.answer("Show top 5 churners.").await.unwrap();

    assert_eq!(answer.intent, Intent::Sql);
    let query = answer.sql_query.as_deref().unwrap();
    assert!(query.contains("LIMIT 5"));
    assert!(query.contains("ORDER BY churn_probability DESC"));

    let Evidence::Sql(table) = &answer.evidence else {
        panic!("expected SQL evidence, got {:?}", answer.evidence);
    };
    let lines: Vec<&str> = table.lines().collect();
    assert!(lines[0].contains("subscriber_id"));
    assert!(lines.len() - 1 <= 5);
    // the highest churn band belongs to one segment
    assert!(lines[1..].iter().all(|l| l.contains("Early High-Risk")));

    assert_eq!(answer.answer, STRUCTURED_ANSWER);
    assert!(answer.missing_sections.is_empty());
    assert_eq!(f.classifier.calls(), 0);

    let prompt = &f.generator.prompts()[0];
    assert!(prompt.contains("### SQL Query Results"));
    assert!(!prompt.contains("### Retrieved Knowledge Context"));
    assert!(prompt.ends_with("### User Question\nShow top 5 churners.\n"));
}

#[tokio::test]
async fn test_strategy_question_uses_retrieval_evidence() {
    let f = standard(STRUCTURED_ANSWER).await;
    let question = "What strategies reduce churn for at-risk customers?";

    let answer = f.copilot.answer(question).await.unwrap();

    assert_eq!(answer.intent, Intent::Rag);
    assert!(answer.sql_query.is_none());

    let Evidence::Retrieval(snippets) = &answer.evidence else {
        panic!("expected retrieval evidence, got {:?}", answer.evidence);
    };
    assert!(snippets.starts_with("**"));
    assert!(snippets.contains("**\n"));
    assert_eq!(snippets.split("\n\n---\n\n").count(), 3);

    for header in ["### Summary", "### Data Evidence", "### Strategic Recommendation"] {
        assert!(answer.answer.contains(header));
    }

    let prompt = &f.generator.prompts()[0];
    assert!(prompt.contains("### Retrieved Knowledge Context"));
    assert!(!prompt.contains("### SQL Query Results"));
    assert!(prompt.contains(question));
}

#[tokio::test]
async fn test_inconclusive_question_asks_classifier() {
    let generator = Arc::new(MockClient::replying(STRUCTURED_ANSWER));
    let (_dir, copilot, classifier) = fixture(MockClient::replying("sql"), generator).await;

    let gathered = copilot.gather("Which subscribers worry you?").await;

    assert_eq!(classifier.calls(), 1);
    assert_eq!(gathered.intent, Intent::Sql);
    let sql = gathered.sql.unwrap();
    assert!(sql.query.contains("LIMIT 10"));
    assert_eq!(gathered.evidence, Evidence::Sql(sql.result));
}

#[tokio::test]
async fn test_missing_sections_are_reported_not_rejected() {
    let f = standard("Churn is high among new subscribers.").await;

    let answer = f.copilot.answer("Show top 5 churners.").await.unwrap();

    assert_eq!(answer.answer, "Churn is high among new subscribers.");
    assert_eq!(
        answer.missing_sections,
        vec!["### Summary", "### Data Evidence", "### Strategic Recommendation"]
    );
}

#[tokio::test]
async fn test_generation_errors_propagate() {
    let inner = Arc::new(MockClient::scripted(vec![Err(AppError::RateLimited(
        "quota".to_string(),
    ))]));
    let generator = Arc::new(RetryingClient::new(inner.clone(), RetryPolicy::none()));
    let (_dir, copilot, _) = fixture(MockClient::replying("rag"), generator).await;

    let err = copilot.answer("Show top 5 churners.").await.unwrap_err();

    assert!(err.is_rate_limited());
    assert_eq!(inner.calls(), 1);
}

#[tokio::test]
async fn test_sql_failure_still_answers() {
    let generator = Arc::new(MockClient::replying(STRUCTURED_ANSWER));
    let classifier = Arc::new(MockClient::replying("rag"));
    let dir = TempDir::new().unwrap();
    let retriever = Retriever::build(corpus(), Arc::new(TrigramProvider::new(384)), 3)
        .await
        .unwrap();

    let copilot = Copilot::new(
        Router::new(classifier, "test-model"),
        SqlGatherer::new(Arc::new(SqliteStore::new(dir.path().join("absent.db")))),
        retriever,
        generator.clone(),
        "test-model",
    );

    let answer = copilot.answer("List top 3 subscribers.").await.unwrap();

    assert_eq!(answer.intent, Intent::Sql);
    assert!(answer.evidence.text().starts_with("SQL execution error:"));
    assert_eq!(generator.calls(), 1);
}
