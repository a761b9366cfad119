//! Prompt builder for rendering the grounded answer template.

use crate::template::{INSTRUCTIONS, PROMPT_TEMPLATE, REQUIRED_SECTIONS, SYSTEM_ROLE};
use crate::types::{BuiltPrompt, BuiltPromptMetadata, Evidence};
use copilot_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;

#[derive(Serialize)]
struct PromptVars<'a> {
    role: &'a str,
    instructions: &'a str,
    knowledge: &'a str,
    sql: &'a str,
    question: &'a str,
}

/// Build the grounded prompt from raw evidence strings.
///
/// Empty (or whitespace-only) evidence is omitted entirely rather than
/// rendered as an empty section. The question is inserted verbatim.
///
/// # Example
/// ```
/// use copilot_prompt::build_prompt;
///
/// let built = build_prompt("Show top 5 churners.", "", "subscriber_id\n1001").unwrap();
/// assert!(built.text.contains("### SQL Query Results"));
/// assert!(!built.text.contains("### Retrieved Knowledge Context"));
/// ```
pub fn build_prompt(question: &str, snippets: &str, sql_result: &str) -> AppResult<BuiltPrompt> {
    let knowledge = snippets.trim();
    let sql = sql_result.trim();

    let vars = PromptVars {
        role: SYSTEM_ROLE,
        instructions: INSTRUCTIONS,
        knowledge,
        sql,
        question,
    };

    let text = render_template(&vars)?;

    tracing::debug!(
        "Built prompt ({} chars, knowledge: {}, sql: {})",
        text.len(),
        !knowledge.is_empty(),
        !sql.is_empty()
    );

    Ok(BuiltPrompt {
        metadata: BuiltPromptMetadata {
            knowledge_included: !knowledge.is_empty(),
            sql_included: !sql.is_empty(),
            prompt_chars: text.chars().count(),
        },
        text,
    })
}

/// Build the grounded prompt from a single evidence bundle.
pub fn build_grounded_prompt(question: &str, evidence: &Evidence) -> AppResult<BuiltPrompt> {
    match evidence {
        Evidence::Sql(text) => build_prompt(question, "", text),
        Evidence::Retrieval(text) => build_prompt(question, text, ""),
    }
}

/// Required section headers absent from `answer`.
pub fn missing_sections(answer: &str) -> Vec<&'static str> {
    REQUIRED_SECTIONS
        .iter()
        .copied()
        .filter(|section| !answer.contains(section))
        .collect()
}

/// Render the prompt template with variables.
fn render_template(vars: &PromptVars<'_>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text prompt, no HTML escaping
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string("grounded", PROMPT_TEMPLATE)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("grounded", vars)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
