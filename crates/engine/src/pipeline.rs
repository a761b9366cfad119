//! The copilot service object: route, gather, compose, generate.

use crate::router::{Intent, Router};
use copilot_core::{AppConfig, AppResult};
use copilot_knowledge::{EmbeddingConfig, Retriever};
use copilot_llm::{create_client, LlmClient, LlmRequest, RetryPolicy, RetryingClient};
use copilot_prompt::{build_grounded_prompt, missing_sections, Evidence};
use copilot_sql::{SqlEvidence, SqlGatherer, SqliteStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Routing decision plus the one evidence bundle it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatheredEvidence {
    pub intent: Intent,
    pub evidence: Evidence,
    /// Present for the SQL path only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<SqlEvidence>,
}

/// Everything shown to the user for one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopilotAnswer {
    pub question: String,
    pub intent: Intent,
    pub evidence: Evidence,
    pub sql_query: Option<String>,
    pub answer: String,
    /// Required headers the generated answer left out
    pub missing_sections: Vec<String>,
}

/// Answers subscriber questions from exactly one evidence path.
///
/// Built once per process and shared by reference; every component is
/// read-only after construction.
pub struct Copilot {
    router: Router,
    sql: SqlGatherer,
    retriever: Retriever,
    generator: Arc<dyn LlmClient>,
    model: String,
}

impl Copilot {
    pub fn new(
        router: Router,
        sql: SqlGatherer,
        retriever: Retriever,
        generator: Arc<dyn LlmClient>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            router,
            sql,
            retriever,
            generator,
            model: model.into(),
        }
    }

    /// Wire the pipeline from configuration.
    ///
    /// The configured provider serves both classification and generation;
    /// only generation goes through the rate-limit retry schedule, which
    /// `cancel` can abort between attempts. The knowledge index is built here.
    pub async fn from_config(config: &AppConfig, cancel: CancellationToken) -> AppResult<Self> {
        let client = create_client(
            &config.provider,
            config.endpoint.as_deref(),
            config.api_key.as_deref(),
        )?;

        let router = Router::new(client.clone(), &config.model);
        let generator =
            RetryingClient::new(client, RetryPolicy::default()).with_cancellation(cancel);

        let store = SqliteStore::new(config.database_file());
        tracing::debug!("Subscriber database: {:?}", store.path());

        let knowledge_file = config.knowledge_file();
        tracing::info!("Building knowledge index from {:?}", knowledge_file);
        let retriever = Retriever::from_corpus(
            &knowledge_file,
            &EmbeddingConfig::from_app_config(config),
            config.top_k,
        )
        .await?;
        tracing::info!("Indexed {} knowledge entries", retriever.index().len());

        Ok(Self::new(
            router,
            SqlGatherer::new(Arc::new(store)),
            retriever,
            Arc::new(generator),
            &config.model,
        ))
    }

    /// Route `question` and gather its evidence, without generating.
    pub async fn gather(&self, question: &str) -> GatheredEvidence {
        let intent = self.router.route(question).await;

        match intent {
            Intent::Sql => {
                let sql = self.sql.gather(question);
                GatheredEvidence {
                    intent,
                    evidence: Evidence::Sql(sql.result.clone()),
                    sql: Some(sql),
                }
            }
            Intent::Rag => GatheredEvidence {
                intent,
                evidence: Evidence::Retrieval(self.retriever.retrieve(question).await),
                sql: None,
            },
        }
    }

    /// Answer `question` end to end.
    ///
    /// Gathering never fails; prompt rendering and generation errors
    /// propagate once retries are exhausted.
    pub async fn answer(&self, question: &str) -> AppResult<CopilotAnswer> {
        let gathered = self.gather(question).await;

        let prompt = build_grounded_prompt(question, &gathered.evidence)?;
        tracing::debug!("Prompt metadata: {:?}", prompt.metadata);

        let request = LlmRequest::new(prompt.text, &self.model);
        tracing::info!("Generating answer with {}", self.generator.provider_name());
        let response = self.generator.complete(&request).await?;

        let missing: Vec<String> = missing_sections(&response.content)
            .into_iter()
            .map(String::from)
            .collect();
        if !missing.is_empty() {
            tracing::warn!("Answer is missing sections: {}", missing.join(", "));
        }

        Ok(CopilotAnswer {
            question: question.to_string(),
            intent: gathered.intent,
            evidence: gathered.evidence,
            sql_query: gathered.sql.map(|s| s.query),
            answer: response.content,
            missing_sections: missing,
        })
    }
}
