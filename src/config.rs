//! # Configuration Module
//!
//! Settings for the two hosted services the enricher talks to, and the
//! options that shape the prompt sent to the language model.
//!
//! ## Key Components
//!
//! - `SupabaseSettings`: project URL and service key for the PostgREST API
//! - `OpenAiSettings`: API key, optional base URL, model and request quota
//! - `EnrichOptions` / `EnrichOptionsBuilder`: prompt limits with defaults
//!
//! Settings are read from environment variables. The binary loads a `.env`
//! file first (via `dotenvy`), so a local `.env` works the same way as an
//! exported environment.

use std::fmt;

use crate::error::{Error, Result};

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default client-side completion quota
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 500;

/// Connection settings for a Supabase project
#[derive(Clone)]
pub struct SupabaseSettings {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,

    /// Service role (or anon) key
    pub key: String,
}

impl SupabaseSettings {
    /// Read `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY` (or `SUPABASE_KEY`)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = required(&lookup, "SUPABASE_URL")?;
        let key = lookup("SUPABASE_SERVICE_ROLE_KEY")
            .filter(|v| !v.is_empty())
            .or_else(|| lookup("SUPABASE_KEY").filter(|v| !v.is_empty()))
            .ok_or_else(|| {
                Error::Config(
                    "SUPABASE_SERVICE_ROLE_KEY (or SUPABASE_KEY) must be set".to_string(),
                )
            })?;

        Ok(Self { url, key })
    }
}

impl fmt::Debug for SupabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseSettings")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Settings for the OpenAI chat completions API
#[derive(Clone)]
pub struct OpenAiSettings {
    /// API key
    pub api_key: String,

    /// Alternative API base URL for compatible gateways
    pub base_url: Option<String>,

    /// Chat model name
    pub model: String,

    /// Client-side request quota
    pub requests_per_minute: u32,
}

impl OpenAiSettings {
    /// Read `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_MODEL` and
    /// `OPENAI_REQUESTS_PER_MINUTE`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = required(&lookup, "OPENAI_API_KEY")?;
        let base_url = lookup("OPENAI_BASE_URL").filter(|v| !v.is_empty());
        let model = lookup("OPENAI_MODEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let requests_per_minute = match lookup("OPENAI_REQUESTS_PER_MINUTE") {
            Some(value) => value
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    Error::Config(format!(
                        "OPENAI_REQUESTS_PER_MINUTE must be a positive integer, got {value:?}"
                    ))
                })?,
            None => DEFAULT_REQUESTS_PER_MINUTE,
        };

        Ok(Self {
            api_key,
            base_url,
            model,
            requests_per_minute,
        })
    }

    /// Replace the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("requests_per_minute", &self.requests_per_minute)
            .finish()
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    lookup(name)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("{name} environment variable must be set")))
}

/// Options for the enrichment prompt
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Upper bound on summary length requested from the model
    pub max_summary_words: usize,

    /// Number of products requested from the model
    pub max_products: usize,

    /// Whether to mention the company website in the prompt
    pub include_website: bool,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            max_summary_words: 80,
            max_products: 5,
            include_website: false,
        }
    }
}

/// Builder for EnrichOptions
#[derive(Debug, Default)]
pub struct EnrichOptionsBuilder {
    options: EnrichOptions,
}

impl EnrichOptionsBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self {
            options: EnrichOptions::default(),
        }
    }

    /// Set the summary word limit
    pub fn max_summary_words(mut self, max_summary_words: usize) -> Self {
        self.options.max_summary_words = max_summary_words;
        self
    }

    /// Set the number of products to ask for
    pub fn max_products(mut self, max_products: usize) -> Self {
        self.options.max_products = max_products;
        self
    }

    /// Mention the website in the prompt
    pub fn include_website(mut self, include_website: bool) -> Self {
        self.options.include_website = include_website;
        self
    }

    /// Build the options
    pub fn build(self) -> EnrichOptions {
        self.options
    }
}

impl EnrichOptions {
    /// Create a new builder
    pub fn builder() -> EnrichOptionsBuilder {
        EnrichOptionsBuilder::new()
    }
}
