//! # Company Enricher
//!
//! Registers companies in a database and enriches them with a short summary
//! and a list of product names obtained from a language model.
//!
//! ## Features
//!
//! - Interpretation of free-text model replies into a summary and products
//! - Rate-limited OpenAI chat completions through `rig`
//! - Hosted Supabase storage (PostgREST) or a local libsql database
//! - A JSON HTTP endpoint and a command-line interface
//!
//! ## Example
//!
//! ```rust,no_run
//! use company_enricher::{Enricher, model::Client, store::SupabaseStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new_openai_from_env()?;
//!     let store = SupabaseStore::from_env()?;
//!     let enricher = Enricher::new(client, store);
//!
//!     let enrichment = enricher.add_company("Acme Corp", "https://acme.com").await?;
//!     println!("{} -> {:?}", enrichment.company_id, enrichment.products);
//!     Ok(())
//! }
//! ```
//!
//! The interpreter can also be used on its own:
//!
//! ```rust
//! use company_enricher::interpret;
//!
//! let parsed = interpret("Acme builds tools.\nProducts: Hammer, Wrench");
//! assert_eq!(parsed.summary, "Acme builds tools");
//! assert_eq!(parsed.products, vec!["Hammer", "Wrench"]);
//! ```

mod error;

pub mod config;
pub mod enrich;
pub mod interpreter;
pub mod model;
pub mod server;
pub mod store;

pub use enrich::{Enricher, Enrichment};
pub use error::{Error, Result};
pub use interpreter::{ParseResult, interpret};

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::enrich::Enricher;
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::interpreter::ParseResult;
    pub use crate::store::{CompanyId, CompanyStore};
}
