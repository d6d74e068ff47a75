//! HTTP-based generator: query rewriting and grounded answers

use super::{ChatMessage, CompletionOptions, Generator, LLMClient, VLLMClient};
use crate::config::LLMServiceConfig;
use crate::error::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;

const REWRITE_OPTIONS: CompletionOptions = CompletionOptions {
    temperature: 0.7,
    max_tokens: 100,
};

const ANSWER_SYSTEM_PROMPT: &str = "You are a knowledgeable assistant. Answer the question \
     using ONLY the provided context. If the answer is not present in the context, \
     say you do not know.";

lazy_static! {
    /// Leading list markers: "1.", "2)", "-", "*", bullets
    static ref LIST_MARKER: Regex = Regex::new(r"^\s*(?:\d+[.)]|[-*•])\s*").unwrap();
}

/// Generator using external HTTP LLM service
pub struct HttpGenerator {
    client: Arc<dyn LLMClient>,
    max_new_tokens: u32,
}

impl HttpGenerator {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LLMClient>, max_new_tokens: u32) -> Self {
        Self {
            client,
            max_new_tokens,
        }
    }

    /// Create from configuration
    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        let max_new_tokens = config.max_new_tokens;
        let client = VLLMClient::new(config)?;
        tracing::info!("LLM client ready | model={}", client.model_name());
        Ok(Self::new(Arc::new(client), max_new_tokens))
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn rewrite_query(&self, query: &str, num_variants: usize) -> Result<Vec<String>> {
        if num_variants == 0 {
            return Ok(Vec::new());
        }

        let messages = vec![ChatMessage::user(build_rewrite_prompt(query, num_variants))];
        let response = self.client.chat_completion(messages, REWRITE_OPTIONS).await?;
        let rewrites = parse_rewrites(&response, num_variants);

        tracing::info!(
            "Query rewritten | original='{}' | variants={}",
            query,
            rewrites.len()
        );

        Ok(rewrites)
    }

    async fn generate_answer(&self, query: &str, context: &str) -> Result<String> {
        let messages = vec![
            ChatMessage::system(ANSWER_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Context:\n{}\n\nQuestion:\n{}",
                context, query
            )),
        ];
        let options = CompletionOptions {
            temperature: 0.0,
            max_tokens: self.max_new_tokens,
        };

        let answer = self
            .client
            .chat_completion(messages, options)
            .await?
            .trim()
            .to_string();

        tracing::info!("Answer generated | chars={}", answer.chars().count());
        Ok(answer)
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

fn build_rewrite_prompt(query: &str, num_variants: usize) -> String {
    format!(
        "Generate {} different search-friendly variations of the following question. \
         List each on a new line, without numbering or commentary.\n\nQuestion: {}",
        num_variants, query
    )
}

/// One variant per non-empty line, list markers and quotes stripped
fn parse_rewrites(response: &str, num_variants: usize) -> Vec<String> {
    response
        .lines()
        .map(|line| {
            let stripped = LIST_MARKER.replace(line.trim(), "");
            stripped
                .trim()
                .trim_matches(|c| c == '"' || c == '\'' || c == '“' || c == '”')
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .take(num_variants)
        .collect()
}
