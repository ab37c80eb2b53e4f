//! Prompt resolution for placed tasks.
//!
//! `google: <query>` becomes a search link, `ai: <question>` is sent to the
//! configured [`AiBackend`]. Anything else is left unresolved.

use reqwest::Url;
use tracing::{debug, info, warn};

use weekplan_core::Suggestion;

use crate::llm::AiBackend;

const GOOGLE_PREFIX: &str = "google:";
const AI_PREFIX: &str = "ai:";
const GOOGLE_SEARCH: &str = "https://www.google.com/search";

pub struct PromptProcessor<B> {
    backend: B,
}

impl<B: AiBackend> PromptProcessor<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub async fn resolve(&self, prompt: &str) -> Option<String> {
        if prompt.trim().is_empty() {
            return None;
        }
        if let Some(query) = prompt.strip_prefix(GOOGLE_PREFIX) {
            return google_link(query.trim());
        }
        if let Some(question) = prompt.strip_prefix(AI_PREFIX) {
            return Some(self.backend.complete(question.trim()).await);
        }
        warn!(prompt, "prompt must start with 'google:' or 'ai:'");
        None
    }

    /// Resolve prompts of every placed task that still lacks a result.
    /// Returns how many were filled in.
    pub async fn enrich(&self, suggestion: &mut Suggestion) -> usize {
        let pending = suggestion.pending_prompts();
        info!(count = pending.len(), "resolving prompts");

        let mut resolved = 0;
        for i in pending {
            let Some(prompt) = suggestion.tasks[i].prompt.clone() else {
                continue;
            };
            if let Some(result) = self.resolve(&prompt).await {
                debug!(task = %suggestion.tasks[i].id, "prompt resolved");
                suggestion.tasks[i].prompt_result = Some(result);
                resolved += 1;
            }
        }
        resolved
    }
}

fn google_link(query: &str) -> Option<String> {
    match Url::parse_with_params(GOOGLE_SEARCH, &[("q", query)]) {
        Ok(url) => Some(format!("[google it]({url})")),
        Err(e) => {
            warn!(query, "cannot build search link: {e}");
            None
        }
    }
}
