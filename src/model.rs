//! # LLM Client Module
//!
//! A small client around a `rig` completion model, with client-side rate
//! limiting so that bursts of enrichment requests stay inside the provider
//! quota.
//!
//! ## Key Components
//!
//! - `Client`: wraps a completion model and sends single-turn prompts
//! - `RateLimitedCompletionModel`: a `CompletionModel` decorator backed by `governor`
//!
//! The default provider is OpenAI chat completions; any other `rig`
//! completion model can be plugged in with [`Client::new`].

use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use ratelimited_completion::RateLimitedCompletionModel;
use rig::{
    agent::AgentBuilder,
    completion::{CompletionModel, Prompt},
    providers::openai,
};
use tracing::{debug, instrument};

use crate::config::OpenAiSettings;
use crate::error::{Error, Result};

#[cfg(test)]
pub mod mock_model;
pub mod ratelimited_completion;

/// Completion model used by [`Client::new_openai`]
pub type OpenAiCompletionModel = RateLimitedCompletionModel<openai::CompletionModel>;

#[derive(Debug, Clone)]
pub struct Client<C>
where
    C: CompletionModel,
{
    completion_model: C,
    model_name: String,
}

impl Client<OpenAiCompletionModel> {
    pub fn new_openai_from_env() -> Result<Self> {
        let settings = OpenAiSettings::from_env()?;
        Ok(Self::new_openai(&settings))
    }

    pub fn new_openai(settings: &OpenAiSettings) -> Self {
        let openai_client = match &settings.base_url {
            Some(base_url) => openai::Client::from_url(&settings.api_key, base_url),
            None => openai::Client::new(&settings.api_key),
        };
        let limiter = RateLimiter::direct(Quota::per_minute(
            NonZeroU32::new(settings.requests_per_minute).unwrap_or(NonZeroU32::MIN),
        ));
        let completion_model = RateLimitedCompletionModel::new(
            openai_client.completion_model(&settings.model),
            limiter,
        );

        Self {
            completion_model,
            model_name: settings.model.clone(),
        }
    }
}

impl<C> Client<C>
where
    C: CompletionModel,
{
    pub fn new(completion_model: C, model_name: impl Into<String>) -> Self {
        Self {
            completion_model,
            model_name: model_name.into(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Send `prompt` as a single user turn and return the text reply
    #[instrument(skip(self, prompt), fields(model = %self.model_name))]
    pub async fn prompt(&self, prompt: &str) -> Result<String> {
        debug!(prompt_length = prompt.len(), "Sending prompt");

        let agent = AgentBuilder::new(self.completion_model.clone()).build();
        agent
            .prompt(prompt)
            .await
            .map_err(|e| Error::Llm(e.to_string()))
    }
}
