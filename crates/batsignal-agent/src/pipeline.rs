// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The retrieve -> complete -> journal pipeline.

use std::sync::Arc;
use std::time::Duration;

use batsignal_config::BatsignalConfig;
use batsignal_core::error::{BatsignalError, ProviderErrorKind};
use batsignal_core::traits::{KnowledgeAdapter, ProviderAdapter};
use batsignal_core::types::{ChatMessage, KnowledgeSnippet, ProviderRequest};
use batsignal_journal::ConversationLog;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Per-call parameters for the provider request.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub system_prompt: String,
    /// `None` uses the provider's configured model.
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Deadline for the whole provider call, retries included.
    pub timeout: Duration,
    /// Knowledge snippets retrieved per message.
    pub max_results: usize,
}

impl PipelineSettings {
    pub fn from_config(config: &BatsignalConfig, system_prompt: String) -> Self {
        Self {
            system_prompt,
            model: Some(config.groq.model.clone()),
            max_tokens: config.groq.max_tokens,
            temperature: config.groq.temperature,
            timeout: config.groq.call_budget(),
            max_results: config.knowledge.max_results,
        }
    }
}

/// Result of one chat turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub reply: String,
    /// Context recorded with the turn, if any.
    pub context: Option<Value>,
    /// Non-fatal problems (knowledge lookup, journal write).
    pub warnings: Vec<String>,
}

/// Orchestrates one conversation turn.
pub struct ChatPipeline {
    provider: Arc<dyn ProviderAdapter>,
    journal: Arc<ConversationLog>,
    knowledge: Option<Arc<dyn KnowledgeAdapter>>,
    settings: PipelineSettings,
}

impl ChatPipeline {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        journal: Arc<ConversationLog>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            provider,
            journal,
            knowledge: None,
            settings,
        }
    }

    /// Grounds every request with snippets from `knowledge`.
    pub fn with_knowledge(mut self, knowledge: Arc<dyn KnowledgeAdapter>) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    pub fn has_knowledge(&self) -> bool {
        self.knowledge.is_some()
    }

    pub fn journal(&self) -> &Arc<ConversationLog> {
        &self.journal
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Produces the persona reply for `message` and journals the turn.
    ///
    /// Provider failures, timeouts, and empty replies are errors and nothing
    /// is journaled. Knowledge and journal failures only add warnings.
    pub async fn respond(
        &self,
        message: &str,
        context: Option<Value>,
    ) -> Result<ChatOutcome, BatsignalError> {
        let mut warnings = Vec::new();

        let snippets = self.retrieve(message, &mut warnings).await;
        let request = self.build_request(message, &snippets);

        let response = tokio::time::timeout(self.settings.timeout, self.provider.complete(request))
            .await
            .map_err(|_| BatsignalError::Timeout {
                duration: self.settings.timeout,
            })??;

        let reply = response.content.trim().to_string();
        if reply.is_empty() {
            return Err(BatsignalError::provider(
                ProviderErrorKind::EmptyReply,
                "provider returned an empty reply",
            ));
        }
        debug!(
            model = response.model,
            completion_tokens = response.usage.completion_tokens,
            "reply received"
        );

        let context = context.filter(|v| !v.is_null()).or_else(|| {
            (!snippets.is_empty()).then(|| {
                Value::Array(snippets.iter().map(|s| Value::String(s.text.clone())).collect())
            })
        });

        if let Err(e) = self.record(message, &reply, context.clone()).await {
            warn!(error = %e, "conversation not recorded");
            warnings.push(format!("conversation not recorded: {e}"));
        }

        Ok(ChatOutcome {
            reply,
            context,
            warnings,
        })
    }

    async fn retrieve(&self, message: &str, warnings: &mut Vec<String>) -> Vec<KnowledgeSnippet> {
        let Some(knowledge) = &self.knowledge else {
            return Vec::new();
        };
        match knowledge.query(message, self.settings.max_results).await {
            Ok(snippets) => {
                debug!(count = snippets.len(), "knowledge snippets retrieved");
                snippets
            }
            Err(e) => {
                warn!(error = %e, "knowledge lookup failed, continuing without context");
                warnings.push(format!("knowledge lookup failed: {e}"));
                Vec::new()
            }
        }
    }

    fn build_request(&self, message: &str, snippets: &[KnowledgeSnippet]) -> ProviderRequest {
        let mut system_prompt = self.settings.system_prompt.clone();
        if !snippets.is_empty() {
            system_prompt.push_str("\n\nRelevant guidance:");
            for snippet in snippets {
                system_prompt.push_str("\n- ");
                system_prompt.push_str(&snippet.text);
            }
        }

        ProviderRequest {
            model: self.settings.model.clone(),
            system_prompt,
            messages: vec![ChatMessage::user(message)],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        }
    }

    /// Appends the turn on the blocking pool so file I/O stays off the
    /// async workers.
    async fn record(
        &self,
        message: &str,
        reply: &str,
        context: Option<Value>,
    ) -> Result<(), BatsignalError> {
        let journal = Arc::clone(&self.journal);
        let message = message.to_string();
        let reply = reply.to_string();

        tokio::task::spawn_blocking(move || journal.record(&message, &reply, context))
            .await
            .map_err(|e| BatsignalError::Internal(format!("journal task failed: {e}")))??;
        info!("conversation recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batsignal_test_utils::{MockProvider, StaticKnowledge};

    fn settings() -> PipelineSettings {
        PipelineSettings {
            system_prompt: "You are Batman.".into(),
            model: None,
            max_tokens: 50,
            temperature: 0.7,
            timeout: Duration::from_secs(5),
            max_results: 3,
        }
    }

    fn pipeline(dir: &std::path::Path) -> ChatPipeline {
        ChatPipeline::new(
            Arc::new(MockProvider::new()),
            Arc::new(ConversationLog::new(dir)),
            settings(),
        )
    }

    #[test]
    fn request_without_snippets_is_plain_persona() {
        let tmp = tempfile::tempdir().unwrap();
        let request = pipeline(tmp.path()).build_request("hi", &[]);
        assert_eq!(request.system_prompt, "You are Batman.");
        assert_eq!(request.messages, vec![ChatMessage::user("hi")]);
        assert_eq!(request.max_tokens, 50);
    }

    #[test]
    fn snippets_are_appended_as_guidance() {
        let tmp = tempfile::tempdir().unwrap();
        let snippet = KnowledgeSnippet {
            id: "id0".into(),
            text: "Keep it short.".into(),
            metadata: Default::default(),
            score: 0.9,
        };
        let request = pipeline(tmp.path()).build_request("hi", &[snippet]);
        assert_eq!(
            request.system_prompt,
            "You are Batman.\n\nRelevant guidance:\n- Keep it short."
        );
    }

    #[test]
    fn settings_follow_config() {
        let config = BatsignalConfig::default();
        let settings = PipelineSettings::from_config(&config, "p".into());
        assert_eq!(settings.model.as_deref(), Some("mixtral-8x7b-32768"));
        assert_eq!(settings.max_tokens, 50);
        assert_eq!(settings.timeout, Duration::from_secs(31));
        assert!(settings.timeout > config.groq.attempt_timeout());
        assert_eq!(settings.max_results, 3);
    }

    #[tokio::test]
    async fn retrieved_snippets_become_journal_context() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = pipeline(tmp.path())
            .with_knowledge(Arc::new(StaticKnowledge::new(["Speak with authority."])));

        let outcome = pipeline.respond("hello", None).await.unwrap();
        assert_eq!(outcome.context, Some(serde_json::json!(["Speak with authority."])));

        let today = pipeline.journal().read_today().unwrap();
        assert_eq!(today[0].context, outcome.context);
    }

    #[tokio::test]
    async fn caller_context_wins_over_snippets() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = pipeline(tmp.path())
            .with_knowledge(Arc::new(StaticKnowledge::new(["ignored"])));

        let ctx = serde_json::json!({"page": "text"});
        let outcome = pipeline.respond("hello", Some(ctx.clone())).await.unwrap();
        assert_eq!(outcome.context, Some(ctx));
    }
}
