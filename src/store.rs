//! # Company Store Module
//!
//! Persistence for companies and their products. The enrichment pipeline only
//! talks to the [`CompanyStore`] trait; two backends implement it:
//!
//! - `SupabaseStore`: the hosted Postgres database through its PostgREST API
//! - `LocalStore`: a libsql database file (or `:memory:`) with the same tables
//!
//! ## Tables
//!
//! - `companies(id, name, website, description)`
//! - `products(id, company_id, name)`, one row per product name

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod error;
mod http;
mod local;
mod schema;
mod supabase;

pub use error::StoreError;
pub use http::HttpOptions;
pub use local::LocalStore;
pub use supabase::SupabaseStore;

/// Identifier of a company row.
///
/// Hosted tables may use integer or UUID keys; the id keeps whichever JSON
/// shape the database returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompanyId {
    Int(i64),
    Text(String),
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompanyId::Int(id) => write!(f, "{id}"),
            CompanyId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for CompanyId {
    fn from(id: i64) -> Self {
        CompanyId::Int(id)
    }
}

impl FromStr for CompanyId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(id) => CompanyId::Int(id),
            Err(_) => CompanyId::Text(s.trim().to_string()),
        })
    }
}

/// Insert payload for a company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub website: String,
}

/// A stored company with its products
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: CompanyId,
    pub name: String,
    pub website: String,
    pub description: Option<String>,
    pub products: Vec<String>,
}

/// Storage backend for companies and products
pub trait CompanyStore: Send + Sync {
    /// Insert a company row and return its id
    fn insert_company(
        &self,
        company: &NewCompany,
    ) -> impl Future<Output = Result<CompanyId, StoreError>> + Send;

    /// Set the description of an existing company
    fn update_description(
        &self,
        id: &CompanyId,
        description: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Insert one product row per name, all at once
    fn insert_products(
        &self,
        company_id: &CompanyId,
        names: &[String],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Load a company and its products
    fn fetch_company(
        &self,
        id: &CompanyId,
    ) -> impl Future<Output = Result<Option<CompanyRecord>, StoreError>> + Send;
}
