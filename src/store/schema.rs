//! # Local Database Schema
//!
//! Creates the `companies` and `products` tables used by the libsql backend.
//! The layout mirrors the hosted tables, with integer keys and creation
//! timestamps added.

use crate::store::error::StoreError;
use libsql::{Connection, params};

/// Initialize the database schema
pub async fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute("PRAGMA foreign_keys = ON", params![])
        .await
        .map_err(|e| StoreError::Schema(format!("Failed to enable foreign keys: {}", e)))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS companies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            website TEXT NOT NULL,
            description TEXT,
            created_at INTEGER NOT NULL
        )",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create companies table: {}", e)))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
        )",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create products table: {}", e)))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_products_company_id ON products(company_id)",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create index on products: {}", e)))?;

    Ok(())
}
