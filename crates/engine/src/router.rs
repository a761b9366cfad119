//! Intent routing: cheap rules first, then a one-word LLM classification.

use copilot_llm::{LlmClient, LlmRequest};
use copilot_sql::contains_phrase;
use once_cell::sync::Lazy;
use regex::RegexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Phrasings that mark an analytical question even when a data keyword
/// such as "highest" is present.
const ANALYTICAL_PATTERNS: [&str; 9] = [
    r"\bwhy\b",
    r"\bwhat causes\b",
    r"\bwhat is the reason\b",
    r"\bexplain\b",
    r"\bhow does\b",
    r"\bwhat drives\b",
    r"\binsight\b",
    r"\bstrateg",
    r"\brecommend",
];

/// Keywords that mark a structured lookup, checked in this order.
pub const STRUCTURED_KEYWORDS: [&str; 10] = [
    "list", "top", "average", "count", "show", "highest", "lowest", "how many", "total", "sum",
];

static ANALYTICAL_OVERRIDES: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new(ANALYTICAL_PATTERNS).expect("constant pattern"));

/// Which evidence path answers a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Structured lookup against the subscriber table
    Sql,
    /// Knowledge or strategy question answered from the corpus
    Rag,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Sql => "sql",
            Intent::Rag => "rag",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule stage alone. `None` means the rules could not decide.
///
/// Analytical overrides are checked before structured keywords, so
/// "Why is churn highest among early subscribers?" is `Rag`.
pub fn rule_based(question: &str) -> Option<Intent> {
    let lower = question.to_lowercase();

    if ANALYTICAL_OVERRIDES.is_match(&lower) {
        return Some(Intent::Rag);
    }

    STRUCTURED_KEYWORDS
        .iter()
        .any(|keyword| contains_phrase(&lower, keyword))
        .then_some(Intent::Sql)
}

/// The fixed instruction sent to the classifier.
pub fn classification_prompt(question: &str) -> String {
    format!(
        "You are a query router for a telecom analytics assistant.\n\
         Classify the following user query as either 'sql' (structured data lookup) \
         or 'rag' (knowledge / strategy question).\n\
         Respond with ONLY one word: sql or rag.\n\n\
         Query: {}",
        question
    )
}

/// Read a classifier reply. Only a bare `sql` or `rag` is accepted.
pub fn parse_label(reply: &str) -> Option<Intent> {
    let label = reply
        .trim()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    match label.as_str() {
        "sql" => Some(Intent::Sql),
        "rag" => Some(Intent::Rag),
        _ => None,
    }
}

/// Routes questions to an evidence path.
///
/// Never fails: anything the classifier cannot settle becomes [`Intent::Rag`].
#[derive(Clone)]
pub struct Router {
    classifier: Option<Arc<dyn LlmClient>>,
    model: String,
}

impl Router {
    pub fn new(classifier: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            classifier: Some(classifier),
            model: model.into(),
        }
    }

    /// A router without a classifier; inconclusive rules fall back to `Rag`.
    pub fn rules_only() -> Self {
        Self {
            classifier: None,
            model: String::new(),
        }
    }

    pub async fn route(&self, question: &str) -> Intent {
        if let Some(intent) = rule_based(question) {
            tracing::info!("Routed by rules: {}", intent);
            return intent;
        }

        let intent = self.classify(question).await;
        tracing::info!("Routed by classifier: {}", intent);
        intent
    }

    async fn classify(&self, question: &str) -> Intent {
        let Some(classifier) = &self.classifier else {
            tracing::warn!("Rules inconclusive and no classifier configured, using rag");
            return Intent::Rag;
        };

        let request =
            LlmRequest::new(classification_prompt(question), &self.model).with_temperature(0.0);

        match classifier.complete(&request).await {
            Ok(response) => parse_label(&response.content).unwrap_or_else(|| {
                tracing::warn!("Unrecognised classifier label {:?}, using rag", response.content);
                Intent::Rag
            }),
            Err(e) => {
                tracing::warn!("Classifier call failed ({}), using rag", e);
                Intent::Rag
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::AppError;
    use copilot_llm::MockClient;

    #[test]
    fn test_override_beats_keyword() {
        assert_eq!(
            rule_based("Why is churn highest among early subscribers?"),
            Some(Intent::Rag)
        );
        assert_eq!(
            rule_based("Recommend offers for the top 5 churners"),
            Some(Intent::Rag)
        );
        assert_eq!(
            rule_based("Explain the pricing sensitivity insight."),
            Some(Intent::Rag)
        );
    }

    #[test]
    fn test_structured_keywords() {
        assert_eq!(
            rule_based("List top 3 highest churn probability subscribers."),
            Some(Intent::Sql)
        );
        assert_eq!(rule_based("Top 5 churners by monthly charges."), Some(Intent::Sql));
        assert_eq!(
            rule_based("How many subscribers are on two year contracts?"),
            Some(Intent::Sql)
        );
    }

    #[test]
    fn test_prefix_overrides() {
        // "strateg" and "recommend" match as prefixes
        assert_eq!(rule_based("Retention strategies?"), Some(Intent::Rag));
        assert_eq!(rule_based("Any recommendations?"), Some(Intent::Rag));
        // "insight" does not
        assert_eq!(rule_based("Insights on churn"), None);
    }

    #[test]
    fn test_inconclusive() {
        assert_eq!(rule_based("Tell me about churn"), None);
        // keywords are whole words only
        assert_eq!(rule_based("Is topping up common?"), None);
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("sql"), Some(Intent::Sql));
        assert_eq!(parse_label("  RAG.\n"), Some(Intent::Rag));
        assert_eq!(parse_label("'sql'"), Some(Intent::Sql));
        assert_eq!(parse_label("use sql please"), None);
        assert_eq!(parse_label(""), None);
    }

    #[test]
    fn test_intent_display_and_serde() {
        assert_eq!(Intent::Sql.to_string(), "sql");
        assert_eq!(serde_json::to_value(Intent::Rag).unwrap(), "rag");
    }

    #[tokio::test]
    async fn test_rules_skip_classifier() {
        let mock = Arc::new(MockClient::replying("rag"));
        let router = Router::new(mock.clone(), "m");

        assert_eq!(router.route("Show top 5 churners.").await, Intent::Sql);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_classifier_fallback() {
        let mock = Arc::new(MockClient::replying(" SQL\n"));
        let router = Router::new(mock.clone(), "m");

        assert_eq!(router.route("Tell me about churn").await, Intent::Sql);
        assert_eq!(mock.calls(), 1);
        assert!(mock.prompts()[0].ends_with("Query: Tell me about churn"));
    }

    #[tokio::test]
    async fn test_classifier_failures_default_to_rag() {
        let failing = Arc::new(MockClient::scripted(vec![Err(AppError::Llm(
            "unavailable".to_string(),
        ))]));
        assert_eq!(
            Router::new(failing, "m").route("Tell me about churn").await,
            Intent::Rag
        );

        let rambling = Arc::new(MockClient::replying("probably sql"));
        assert_eq!(
            Router::new(rambling, "m").route("Tell me about churn").await,
            Intent::Rag
        );

        assert_eq!(
            Router::rules_only().route("Tell me about churn").await,
            Intent::Rag
        );
    }
}
