//! # Enrichment Pipeline
//!
//! Registers a company, asks the language model to describe it, interprets
//! the reply and writes the result back to the store.
//!
//! ## Steps
//!
//! 1. Insert the company row and keep its id
//! 2. Prompt the model for a short summary and a comma-separated product list
//! 3. Interpret the free-text reply (see [`crate::interpreter`])
//! 4. Store the summary as the company description
//! 5. Insert one product row per parsed product name
//!
//! A failure in any step aborts the run. The company row from step 1 is kept.

use rig::completion::CompletionModel;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::EnrichOptions;
use crate::error::{Error, Result};
use crate::interpreter::{ParseResult, interpret_with_strategy};
use crate::model::Client;
use crate::store::{CompanyId, CompanyStore, NewCompany};

/// Outcome of one enrichment run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub company_id: CompanyId,
    pub summary: String,
    pub products: Vec<String>,
}

/// Build the prompt sent to the model for one company
pub fn build_prompt(name: &str, website: &str, options: &EnrichOptions) -> String {
    let mut prompt = format!(
        "Summarize in ≤ {} words what \"{}\" does and list up to {} distinct product names (comma‑separated).",
        options.max_summary_words, name, options.max_products
    );
    if options.include_website && !website.is_empty() {
        prompt.push_str(&format!(" The company's website is {}.", website));
    }
    prompt
}

/// Ask the model about a company and return its raw reply
#[instrument(skip(client, options))]
pub async fn describe<C>(
    client: &Client<C>,
    name: &str,
    website: &str,
    options: &EnrichOptions,
) -> Result<String>
where
    C: CompletionModel,
{
    let raw = client.prompt(&build_prompt(name, website, options)).await?;
    debug!(raw = %raw, "Model reply");
    Ok(raw)
}

/// Ask the model about a company and interpret the reply, without storing anything
#[instrument(skip(client, options))]
pub async fn preview<C>(
    client: &Client<C>,
    name: &str,
    website: &str,
    options: &EnrichOptions,
) -> Result<ParseResult>
where
    C: CompletionModel,
{
    let raw = describe(client, name, website, options).await?;
    let (strategy, parsed) = interpret_with_strategy(&raw);
    info!(
        %strategy,
        summary = %parsed.summary,
        products = ?parsed.products,
        "Parsed model reply"
    );
    Ok(parsed)
}

/// Runs the enrichment pipeline against a model and a store
pub struct Enricher<C, S>
where
    C: CompletionModel,
    S: CompanyStore,
{
    client: Client<C>,
    store: S,
    options: EnrichOptions,
}

impl<C, S> Enricher<C, S>
where
    C: CompletionModel,
    S: CompanyStore,
{
    pub fn new(client: Client<C>, store: S) -> Self {
        Self::with_options(client, store, EnrichOptions::default())
    }

    pub fn with_options(client: Client<C>, store: S, options: EnrichOptions) -> Self {
        Self {
            client,
            store,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// See [`describe`]
    pub async fn describe(&self, name: &str, website: &str) -> Result<String> {
        describe(&self.client, name, website, &self.options).await
    }

    /// See [`preview`]
    pub async fn preview(&self, name: &str, website: &str) -> Result<ParseResult> {
        preview(&self.client, name, website, &self.options).await
    }

    /// Register a company and enrich it with a summary and products
    #[instrument(skip(self))]
    pub async fn add_company(&self, name: &str, website: &str) -> Result<Enrichment> {
        let name = name.trim();
        let website = website.trim();
        if name.is_empty() {
            return Err(Error::InvalidRequest("company name must not be empty".to_string()));
        }

        info!("Adding company");
        let company_id = self
            .store
            .insert_company(&NewCompany {
                name: name.to_string(),
                website: website.to_string(),
            })
            .await?;

        let ParseResult { summary, products } = self.preview(name, website).await?;

        self.store.update_description(&company_id, &summary).await?;

        if products.is_empty() {
            warn!(%company_id, "No products returned by the model");
        } else {
            self.store.insert_products(&company_id, &products).await?;
        }

        info!(%company_id, products = products.len(), "Company enriched");
        Ok(Enrichment {
            company_id,
            summary,
            products,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mock_model::MockCompletionModel;
    use crate::store::LocalStore;

    async fn enricher(reply: &str) -> (Enricher<MockCompletionModel, LocalStore>, MockCompletionModel) {
        let model = MockCompletionModel::new();
        model.set_text_response(reply).await;
        let store = LocalStore::open_in_memory().await.unwrap();
        (Enricher::new(Client::new(model.clone(), "mock"), store), model)
    }

    #[test]
    fn test_build_prompt_defaults() {
        let prompt = build_prompt("Acme Corp", "https://acme.com", &EnrichOptions::default());

        assert_eq!(
            prompt,
            "Summarize in ≤ 80 words what \"Acme Corp\" does and list up to 5 distinct product names (comma‑separated)."
        );
    }

    #[test]
    fn test_build_prompt_with_website() {
        let options = EnrichOptions::builder()
            .max_summary_words(50)
            .max_products(3)
            .include_website(true)
            .build();

        let prompt = build_prompt("Acme Corp", "https://acme.com", &options);

        assert!(prompt.starts_with("Summarize in ≤ 50 words what \"Acme Corp\""));
        assert!(prompt.contains("list up to 3 distinct product names"));
        assert!(prompt.ends_with("The company's website is https://acme.com."));
    }

    #[tokio::test]
    async fn test_add_company_stores_summary_and_products() {
        let (enricher, model) = enricher(
            "Acme makes widgets. The product names include Widget A, Widget B and Widget C.",
        )
        .await;

        let enrichment = enricher
            .add_company("Acme Corp", "https://acme.com")
            .await
            .unwrap();

        assert_eq!(enrichment.summary, "Acme makes widgets");
        assert_eq!(enrichment.products, vec!["Widget A", "Widget B", "Widget C"]);
        assert_eq!(model.calls(), 1);

        let record = enricher
            .store()
            .fetch_company(&enrichment.company_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.name, "Acme Corp");
        assert_eq!(record.description.as_deref(), Some("Acme makes widgets"));
        assert_eq!(record.products, enrichment.products);
    }

    #[tokio::test]
    async fn test_add_company_without_products() {
        let (enricher, _) = enricher("Acme does things.").await;

        let enrichment = enricher
            .add_company("Acme Corp", "https://acme.com")
            .await
            .unwrap();

        assert_eq!(enrichment.summary, "Acme does things.");
        assert!(enrichment.products.is_empty());

        let record = enricher
            .store()
            .fetch_company(&enrichment.company_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.description.as_deref(), Some("Acme does things."));
        assert!(record.products.is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected_before_insert() {
        let (enricher, model) = enricher("unused").await;

        let result = enricher.add_company("   ", "https://acme.com").await;

        assert!(matches!(result, Err(Error::InvalidRequest(_))));
        assert_eq!(model.calls(), 0);
        assert!(
            enricher
                .store()
                .fetch_company(&CompanyId::Int(1))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_model_failure_keeps_company_row() {
        let (enricher, model) = enricher("unused").await;
        model.set_failure("service unavailable").await;

        let result = enricher.add_company("Acme Corp", "https://acme.com").await;

        assert!(matches!(result, Err(Error::Llm(_))));
        let record = enricher
            .store()
            .fetch_company(&CompanyId::Int(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.description, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_runs_share_one_local_store() {
        let (enricher, model) = enricher("Acme builds software tools.\nProducts: Tool One, Tool Two").await;
        let enricher = std::sync::Arc::new(enricher);

        let mut handles = Vec::new();
        for i in 0..16 {
            let enricher = std::sync::Arc::clone(&enricher);
            handles.push(tokio::spawn(async move {
                enricher
                    .add_company(&format!("Acme {i}"), "https://acme.com")
                    .await
            }));
        }
        for handle in handles {
            let enrichment = handle.await.unwrap().unwrap();
            let record = enricher
                .store()
                .fetch_company(&enrichment.company_id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(record.products, vec!["Tool One", "Tool Two"]);
        }
        assert_eq!(model.calls(), 16);
    }

    #[tokio::test]
    async fn test_describe_returns_raw_reply() {
        let model = MockCompletionModel::new();
        model.set_text_response("  Acme does things.  ").await;
        let client = Client::new(model.clone(), "mock");

        let raw = describe(&client, "Acme Corp", "https://acme.com", &EnrichOptions::default())
            .await
            .unwrap();

        assert_eq!(raw, "  Acme does things.  ");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_preview_without_a_store() {
        let model = MockCompletionModel::new();
        model
            .set_text_response("Acme makes widgets. The product names include Widget A and Widget B.")
            .await;
        let client = Client::new(model, "mock");

        let parsed = preview(&client, "Acme Corp", "https://acme.com", &EnrichOptions::default())
            .await
            .unwrap();

        assert_eq!(parsed.summary, "Acme makes widgets");
        assert_eq!(parsed.products, vec!["Widget A", "Widget B"]);
    }

    #[tokio::test]
    async fn test_preview_does_not_touch_store() {
        let (enricher, _) = enricher("Acme builds software tools.\nProducts: Tool One, Tool Two").await;

        let parsed = enricher.preview("Acme Corp", "https://acme.com").await.unwrap();

        assert_eq!(parsed.summary, "Acme builds software tools");
        assert_eq!(parsed.products, vec!["Tool One", "Tool Two"]);
        assert!(
            enricher
                .store()
                .fetch_company(&CompanyId::Int(1))
                .await
                .unwrap()
                .is_none()
        );
    }
}
