//! Supabase backend
//!
//! Stores companies and products in a hosted Supabase project through its
//! PostgREST API.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::SupabaseSettings;
use crate::store::http::{HttpOptions, RestClient};
use crate::store::{CompanyId, CompanyRecord, CompanyStore, NewCompany, StoreError};

const COMPANIES: &str = "companies";
const PRODUCTS: &str = "products";

/// Ask PostgREST for a single JSON object instead of an array
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

#[derive(Debug, Deserialize)]
struct IdRow {
    id: CompanyId,
}

#[derive(Debug, Serialize)]
struct ProductRow<'a> {
    company_id: &'a CompanyId,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompanyRow {
    id: CompanyId,
    name: String,
    website: Option<String>,
    description: Option<String>,
    #[serde(default)]
    products: Vec<ProductName>,
}

#[derive(Debug, Deserialize)]
struct ProductName {
    name: String,
}

/// Company store backed by a Supabase project
#[derive(Clone)]
pub struct SupabaseStore {
    http: RestClient,
}

impl SupabaseStore {
    pub fn new(settings: &SupabaseSettings) -> Result<Self, StoreError> {
        Self::with_options(settings, HttpOptions::default())
    }

    pub fn with_options(
        settings: &SupabaseSettings,
        options: HttpOptions,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            http: RestClient::new(&settings.url, settings.key.clone(), options)?,
        })
    }

    pub fn from_env() -> crate::error::Result<Self> {
        let settings = SupabaseSettings::from_env()?;
        Ok(Self::new(&settings)?)
    }
}

fn id_filter(id: &CompanyId) -> String {
    format!("eq.{id}")
}

impl CompanyStore for SupabaseStore {
    #[instrument(skip(self))]
    async fn insert_company(&self, company: &NewCompany) -> Result<CompanyId, StoreError> {
        let request = self
            .http
            .request(Method::POST, COMPANIES)?
            .query(&[("select", "id")])
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(company);

        let row: IdRow = self.http.send_json(request).await?;
        debug!("Inserted company {}", row.id);
        Ok(row.id)
    }

    #[instrument(skip(self, description))]
    async fn update_description(&self, id: &CompanyId, description: &str) -> Result<(), StoreError> {
        let request = self
            .http
            .request(Method::PATCH, COMPANIES)?
            .query(&[("id", id_filter(id)), ("select", "id".to_string())])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "description": description }));

        let updated: Vec<IdRow> = self.http.send_json(request).await?;
        if updated.is_empty() {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    #[instrument(skip(self, names), fields(count = names.len()))]
    async fn insert_products(&self, company_id: &CompanyId, names: &[String]) -> Result<(), StoreError> {
        if names.is_empty() {
            return Ok(());
        }

        let rows: Vec<ProductRow<'_>> = names
            .iter()
            .map(|name| ProductRow {
                company_id,
                name: name.as_str(),
            })
            .collect();

        let request = self
            .http
            .request(Method::POST, PRODUCTS)?
            .header("Prefer", "return=minimal")
            .json(&rows);

        self.http.send(request).await
    }

    #[instrument(skip(self))]
    async fn fetch_company(&self, id: &CompanyId) -> Result<Option<CompanyRecord>, StoreError> {
        let request = self.http.request(Method::GET, COMPANIES)?.query(&[
            ("id", id_filter(id)),
            (
                "select",
                "id,name,website,description,products(name)".to_string(),
            ),
        ]);

        let rows: Vec<CompanyRow> = self.http.send_json(request).await?;

        Ok(rows.into_iter().next().map(|row| CompanyRecord {
            id: row.id,
            name: row.name,
            website: row.website.unwrap_or_default(),
            description: row.description,
            products: row.products.into_iter().map(|p| p.name).collect(),
        }))
    }
}
