//! Local libsql backend
//!
//! Keeps companies and products in a libsql database file, which is handy
//! for offline runs and tests. `:memory:` gives a throwaway database.
//!
//! Clones share one connection. Each operation holds it for its whole
//! duration, so a product transaction never overlaps another statement.

use std::sync::Arc;

use chrono::Utc;
use libsql::{params, Connection, Row, Value};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::store::schema;
use crate::store::{CompanyId, CompanyRecord, CompanyStore, NewCompany, StoreError};

/// Company store backed by a libsql connection
#[derive(Clone)]
pub struct LocalStore {
    conn: Arc<Mutex<Connection>>,
}

impl LocalStore {
    /// Wrap an open connection, creating the tables if needed
    #[instrument(skip(conn))]
    pub async fn new(conn: Connection) -> Result<Self, StoreError> {
        schema::initialize_schema(&conn).await?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open (or create) a database file
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open database: {}", e)))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to connect to database: {}", e)))?;

        Self::new(conn).await
    }

    /// Open a fresh in-memory database
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:").await
    }
}

async fn product_names(conn: &Connection, company_id: i64) -> Result<Vec<String>, StoreError> {
    let mut rows = conn
        .query(
            "SELECT name FROM products WHERE company_id = ?1 ORDER BY id",
            params![company_id],
        )
        .await?;

    let mut names = Vec::new();
    while let Some(row) = rows.next().await? {
        names.push(row.get::<String>(0)?);
    }
    Ok(names)
}

/// Local rows always use integer keys
fn row_id(id: &CompanyId) -> Result<i64, StoreError> {
    match id {
        CompanyId::Int(id) => Ok(*id),
        CompanyId::Text(text) => text
            .parse()
            .map_err(|_| StoreError::Data(format!("Invalid local company id: {}", text))),
    }
}

fn optional_text(row: &Row, index: i32) -> Result<Option<String>, StoreError> {
    match row.get_value(index)? {
        Value::Text(text) => Ok(Some(text)),
        Value::Null => Ok(None),
        other => Err(StoreError::Data(format!(
            "Expected text in column {}, found {:?}",
            index, other
        ))),
    }
}

impl CompanyStore for LocalStore {
    #[instrument(skip(self))]
    async fn insert_company(&self, company: &NewCompany) -> Result<CompanyId, StoreError> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "INSERT INTO companies (name, website, created_at) VALUES (?1, ?2, ?3) RETURNING id",
                params![
                    company.name.clone(),
                    company.website.clone(),
                    Utc::now().timestamp()
                ],
            )
            .await?;

        let row = rows
            .next()
            .await?
            .ok_or_else(|| StoreError::Data("No id returned for inserted company".to_string()))?;
        let id: i64 = row.get(0)?;

        debug!("Inserted company {}", id);
        Ok(CompanyId::Int(id))
    }

    #[instrument(skip(self, description))]
    async fn update_description(&self, id: &CompanyId, description: &str) -> Result<(), StoreError> {
        let changed = self
            .conn
            .lock()
            .await
            .execute(
                "UPDATE companies SET description = ?1 WHERE id = ?2",
                params![description.to_string(), row_id(id)?],
            )
            .await?;

        if changed == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    #[instrument(skip(self, names), fields(count = names.len()))]
    async fn insert_products(&self, company_id: &CompanyId, names: &[String]) -> Result<(), StoreError> {
        if names.is_empty() {
            return Ok(());
        }

        let company_id = row_id(company_id)?;
        let now = Utc::now().timestamp();

        let conn = self.conn.lock().await;
        let tx = conn.transaction().await?;
        for name in names {
            tx.execute(
                "INSERT INTO products (company_id, name, created_at) VALUES (?1, ?2, ?3)",
                params![company_id, name.clone(), now],
            )
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_company(&self, id: &CompanyId) -> Result<Option<CompanyRecord>, StoreError> {
        let company_id = row_id(id)?;
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT id, name, website, description FROM companies WHERE id = ?1",
                params![company_id],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };

        let record = CompanyRecord {
            id: CompanyId::Int(row.get(0)?),
            name: row.get(1)?,
            website: row.get(2)?,
            description: optional_text(&row, 3)?,
            products: product_names(&conn, company_id).await?,
        };
        Ok(Some(record))
    }
}
