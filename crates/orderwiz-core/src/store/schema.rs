//! Table definition and structure checks for the orders database.

use std::collections::HashSet;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, StorageError};

/// Columns every orders table must have.
pub const EXPECTED_COLUMNS: [&str; 12] = [
    "id",
    "order_number",
    "amount_cents",
    "image_path",
    "note",
    "comment_with_picture",
    "commented",
    "revealed",
    "reimbursed",
    "reimbursed_amount_cents",
    "created_at",
    "updated_at",
];

/// Create the orders table and its index if they do not exist yet.
pub fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_number TEXT NOT NULL,
            amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
            image_path TEXT,
            note TEXT,
            comment_with_picture INTEGER NOT NULL DEFAULT 0,
            commented INTEGER NOT NULL DEFAULT 0,
            revealed INTEGER NOT NULL DEFAULT 0,
            reimbursed INTEGER NOT NULL DEFAULT 0,
            reimbursed_amount_cents INTEGER NOT NULL DEFAULT 0 CHECK (reimbursed_amount_cents >= 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_orders_order_number ON orders(order_number)",
        [],
    )?;

    Ok(())
}

/// Check that the orders table exists with every expected column.
pub fn verify(conn: &Connection) -> Result<()> {
    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'orders'",
        [],
        |row| row.get(0),
    )?;

    if table_count == 0 {
        return Err(StorageError::Schema("orders table not found".to_string()).into());
    }

    let mut stmt = conn.prepare("PRAGMA table_info(orders)")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<HashSet<String>>>()?;

    let missing: Vec<&str> = EXPECTED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !columns.contains(*c))
        .collect();

    if !missing.is_empty() {
        return Err(StorageError::Schema(format!("missing columns: {}", missing.join(", "))).into());
    }

    debug!("Database structure verified ({} columns)", columns.len());
    Ok(())
}
