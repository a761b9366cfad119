//! Query templates and keyword-driven template selection.
//!
//! Only the extracted row limit is ever interpolated into SQL text; the
//! question itself never reaches the query string.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Row limit used when the question names none.
pub const DEFAULT_LIMIT: u32 = 10;

static LEADING_LIMIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:top|list|show|lowest|highest)\s+(\d+)\b").expect("constant pattern")
});

static TRAILING_LIMIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d+)\s+(?:highest|lowest|subscriber|record)").expect("constant pattern")
});

/// One read-only query template over `subscribers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Average,
    Top,
    Highest,
    Lowest,
    List,
    Show,
    Count,
    HowMany,
    Total,
    Sum,
    /// Fallback when no keyword matches
    Default,
}

impl QueryKind {
    /// Keyword precedence: the first kind whose keyword appears wins.
    pub const ORDERED: [QueryKind; 10] = [
        QueryKind::Average,
        QueryKind::Top,
        QueryKind::Highest,
        QueryKind::Lowest,
        QueryKind::List,
        QueryKind::Show,
        QueryKind::Count,
        QueryKind::HowMany,
        QueryKind::Total,
        QueryKind::Sum,
    ];

    /// Trigger phrase, `None` for the fallback.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            QueryKind::Average => Some("average"),
            QueryKind::Top => Some("top"),
            QueryKind::Highest => Some("highest"),
            QueryKind::Lowest => Some("lowest"),
            QueryKind::List => Some("list"),
            QueryKind::Show => Some("show"),
            QueryKind::Count => Some("count"),
            QueryKind::HowMany => Some("how many"),
            QueryKind::Total => Some("total"),
            QueryKind::Sum => Some("sum"),
            QueryKind::Default => None,
        }
    }

    /// First kind (by precedence) whose keyword occurs anywhere in `question`.
    ///
    /// Substring matching, so "averages" and "totals" still select their
    /// aggregate. Routing uses whole words; see [`contains_phrase`].
    pub fn select(question: &str) -> QueryKind {
        let lower = question.to_lowercase();
        Self::ORDERED
            .into_iter()
            .find(|kind| kind.keyword().is_some_and(|kw| lower.contains(kw)))
            .unwrap_or(QueryKind::Default)
    }

    /// Whether the template takes a row limit.
    pub fn uses_limit(&self) -> bool {
        matches!(
            self,
            QueryKind::Top
                | QueryKind::Highest
                | QueryKind::Lowest
                | QueryKind::List
                | QueryKind::Show
                | QueryKind::Default
        )
    }

    /// Render the template with row limit `n`.
    pub fn render(&self, n: u32) -> String {
        match self {
            QueryKind::Average => "SELECT segment_label, ROUND(AVG(churn_probability), 4) AS avg_churn_prob \
                 FROM subscribers GROUP BY segment_label ORDER BY avg_churn_prob DESC;"
                .to_string(),
            QueryKind::Top | QueryKind::Highest => format!(
                "SELECT subscriber_id, segment_label, churn_probability, monthly_charges, contract_type \
                 FROM subscribers ORDER BY churn_probability DESC LIMIT {};",
                n
            ),
            QueryKind::Lowest => format!(
                "SELECT subscriber_id, segment_label, churn_probability, monthly_charges, contract_type \
                 FROM subscribers ORDER BY churn_probability ASC LIMIT {};",
                n
            ),
            QueryKind::List | QueryKind::Default => format!(
                "SELECT subscriber_id, segment_label, churn_probability, monthly_charges, contract_type, tenure \
                 FROM subscribers ORDER BY churn_probability DESC LIMIT {};",
                n
            ),
            QueryKind::Show => format!(
                "SELECT subscriber_id, segment_label, churn_probability, monthly_charges, contract_type, tenure \
                 FROM subscribers LIMIT {};",
                n
            ),
            QueryKind::Count | QueryKind::HowMany => "SELECT contract_type, COUNT(*) AS subscriber_count \
                 FROM subscribers GROUP BY contract_type ORDER BY subscriber_count DESC;"
                .to_string(),
            QueryKind::Total => "SELECT segment_label, COUNT(*) AS total_subscribers \
                 FROM subscribers GROUP BY segment_label ORDER BY total_subscribers DESC;"
                .to_string(),
            QueryKind::Sum => "SELECT segment_label, ROUND(SUM(monthly_charges), 2) AS total_monthly_revenue \
                 FROM subscribers GROUP BY segment_label ORDER BY total_monthly_revenue DESC;"
                .to_string(),
        }
    }
}

/// Row limit named in the question, or `default`.
///
/// Looks for "top N" / "list N" / "show N" / "lowest N" / "highest N" first,
/// then "N highest" / "N lowest" / "N subscriber(s)" / "N record(s)".
/// A number too large for `u32` counts as absent.
pub fn extract_limit(question: &str, default: u32) -> u32 {
    let lower = question.to_lowercase();

    [&*LEADING_LIMIT, &*TRAILING_LIMIT]
        .into_iter()
        .find_map(|re| re.captures(&lower))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(default)
}

/// A chosen template and the query text rendered from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub kind: QueryKind,
    /// `None` for aggregate templates, which return every group
    pub limit: Option<u32>,
    pub sql: String,
}

impl QueryPlan {
    pub fn for_question(question: &str, default_limit: u32) -> Self {
        let kind = QueryKind::select(question);
        let limit = kind
            .uses_limit()
            .then(|| extract_limit(question, default_limit));
        let sql = kind.render(limit.unwrap_or(default_limit));

        tracing::debug!("Selected query template {:?} (limit {:?})", kind, limit);
        Self { kind, limit, sql }
    }
}

/// Pick and render the query template for `question`.
pub fn pick_query(question: &str) -> String {
    pick_query_with(question, DEFAULT_LIMIT)
}

/// As [`pick_query`], with an explicit fallback limit.
pub fn pick_query_with(question: &str, default_limit: u32) -> String {
    QueryPlan::for_question(question, default_limit).sql
}

/// Whether `phrase` occurs in `text` on word boundaries.
///
/// Both sides are split on non-alphanumeric characters, so "top-5" contains
/// "top" but "topping" does not. Multi-word phrases must appear as
/// consecutive words.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    let words: Vec<&str> = split_words(text).collect();
    let needle: Vec<&str> = split_words(phrase).collect();

    !needle.is_empty() && words.windows(needle.len()).any(|w| w == needle.as_slice())
}

fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}
