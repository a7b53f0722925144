//! SQLite-backed order store.
//!
//! Every call goes straight to the database. Nothing is cached in memory, so
//! the file is the only source of truth and the last write wins.

mod images;
pub mod schema;

pub use images::{detect_format, ImageKind, ImageRetention, ImageStore};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use rust_decimal::Decimal;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::error::{OrderError, Result};
use crate::models::order::{from_cents, to_cents, Order, OrderDraft, OrderPatch, OrderSort};

/// Default tolerance for [`OrderStore::search_by_amount`]: two currency units.
pub const AMOUNT_TOLERANCE: Decimal = Decimal::from_parts(200, 0, 0, false, 2);

const ORDER_COLUMNS: &str = "id, order_number, amount_cents, image_path, note, \
     comment_with_picture, commented, revealed, reimbursed, reimbursed_amount_cents, \
     created_at, updated_at";

/// Store behaviour switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Image handling on delete and on image replacement.
    pub image_retention: ImageRetention,
}

/// CRUD and search over the `orders` table.
///
/// The store owns its connection and is meant to be used from one thread
/// at a time.
pub struct OrderStore {
    conn: Connection,
    images: ImageStore,
    options: StoreOptions,
}

impl OrderStore {
    /// Wrap an existing connection, creating the schema if needed.
    pub fn new(conn: Connection, images: ImageStore, options: StoreOptions) -> Result<Self> {
        schema::create_tables(&conn)?;
        Ok(Self {
            conn,
            images,
            options,
        })
    }

    /// Open (or create) a database file.
    pub fn open(path: &Path, images: ImageStore, options: StoreOptions) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let existed = path.exists();
        let conn = Connection::open(path)?;
        let store = Self::new(conn, images, options)?;

        if existed {
            debug!("Opened database {}", path.display());
        } else {
            info!("Created new database {}", path.display());
        }

        Ok(store)
    }

    /// Open a throwaway in-memory database.
    pub fn open_in_memory(images: ImageStore) -> Result<Self> {
        Self::new(Connection::open_in_memory()?, images, StoreOptions::default())
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Check the table structure.
    pub fn verify_schema(&self) -> Result<()> {
        schema::verify(&self.conn)
    }

    /// Persist a new order and return it with its id and timestamps.
    pub fn insert(&self, draft: OrderDraft) -> Result<Order> {
        draft.validate()?;

        let now = format_timestamp(timestamp_now());
        self.conn.execute(
            "INSERT INTO orders (order_number, amount_cents, image_path, note,
                comment_with_picture, commented, revealed, reimbursed,
                reimbursed_amount_cents, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                draft.order_number,
                to_cents(draft.amount),
                draft.image_path.as_deref().map(path_to_text),
                draft.note,
                draft.comment_with_picture,
                draft.commented,
                draft.revealed,
                draft.reimbursed,
                to_cents(draft.reimbursed_amount),
                now,
                now,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Inserted order {} ({})", id, draft.order_number);
        self.get(id)
    }

    /// Fetch one order.
    pub fn get(&self, id: i64) -> Result<Order> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], order_from_row)
            .optional()?
            .ok_or(OrderError::NotFound(id))
    }

    /// Apply a partial update and return the stored result.
    ///
    /// `updated_at` always moves forward, even for an empty patch.
    pub fn update(&self, id: i64, patch: OrderPatch) -> Result<Order> {
        patch.validate()?;

        let mut order = self.get(id)?;
        let previous_image = order.image_path.clone();

        patch.apply_to(&mut order);
        order.updated_at = next_timestamp(order.updated_at);

        let changed = self.conn.execute(
            "UPDATE orders SET order_number = ?1, amount_cents = ?2, image_path = ?3, note = ?4,
                comment_with_picture = ?5, commented = ?6, revealed = ?7, reimbursed = ?8,
                reimbursed_amount_cents = ?9, updated_at = ?10
             WHERE id = ?11",
            params![
                order.order_number,
                to_cents(order.amount),
                order.image_path.as_deref().map(path_to_text),
                order.note,
                order.comment_with_picture,
                order.commented,
                order.revealed,
                order.reimbursed,
                to_cents(order.reimbursed_amount),
                format_timestamp(order.updated_at),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(OrderError::NotFound(id));
        }

        info!("Updated order {}", id);

        if let Some(old) = previous_image.filter(|old| order.image_path.as_ref() != Some(old)) {
            self.discard_image(&old, self.options.image_retention);
        }

        self.get(id)
    }

    /// Remove an order, handling its image per the configured retention.
    pub fn delete(&self, id: i64) -> Result<()> {
        self.delete_with_retention(id, self.options.image_retention)
    }

    /// Remove an order with an explicit image retention policy.
    pub fn delete_with_retention(&self, id: i64, retention: ImageRetention) -> Result<()> {
        let order = self.get(id)?;

        let removed = self
            .conn
            .execute("DELETE FROM orders WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(OrderError::NotFound(id));
        }

        info!("Deleted order {} ({})", id, order.order_number);

        if let Some(path) = order.image_path {
            self.discard_image(&path, retention);
        }

        Ok(())
    }

    /// Remove every order. Returns the number of rows deleted.
    pub fn delete_all(&self) -> Result<usize> {
        let orders = self.list_all()?;
        let removed = self.conn.execute("DELETE FROM orders", [])?;

        for path in orders.into_iter().filter_map(|o| o.image_path) {
            self.discard_image(&path, self.options.image_retention);
        }

        info!("Deleted all {} orders", removed);
        Ok(removed)
    }

    /// All orders in insertion order.
    pub fn list_all(&self) -> Result<Vec<Order>> {
        self.list_sorted(OrderSort::IdAsc)
    }

    /// All orders in the requested order.
    pub fn list_sorted(&self, sort: OrderSort) -> Result<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY {}",
            sort.as_sql()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let orders = stmt
            .query_map([], order_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Listed {} orders ({:?})", orders.len(), sort);
        Ok(orders)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Case-insensitive substring search on the order number.
    ///
    /// A blank query matches every order.
    pub fn search_by_order_number(&self, query: &str) -> Result<Vec<Order>> {
        let needle = query.trim().to_lowercase();
        let orders = self.list_all()?;

        if needle.is_empty() {
            return Ok(orders);
        }

        let matches: Vec<Order> = orders
            .into_iter()
            .filter(|o| o.order_number.to_lowercase().contains(&needle))
            .collect();

        debug!("Order number search '{}' matched {} orders", query, matches.len());
        Ok(matches)
    }

    /// Orders whose amount is within [`AMOUNT_TOLERANCE`] of `target`.
    pub fn search_by_amount(&self, target: Decimal) -> Result<Vec<Order>> {
        self.search_by_amount_within(target, AMOUNT_TOLERANCE)
    }

    /// Orders with `|amount - target| <= tolerance`.
    pub fn search_by_amount_within(&self, target: Decimal, tolerance: Decimal) -> Result<Vec<Order>> {
        if tolerance.is_sign_negative() && !tolerance.is_zero() {
            return Err(OrderError::validation("tolerance", "must not be negative"));
        }

        let matches: Vec<Order> = self
            .list_all()?
            .into_iter()
            .filter(|o| (o.amount - target).abs() <= tolerance)
            .collect();

        debug!(
            "Amount search {} ± {} matched {} orders",
            target,
            tolerance,
            matches.len()
        );
        Ok(matches)
    }

    /// Copy an image file into the managed directory and attach it.
    pub fn attach_image(&self, id: i64, source: &Path) -> Result<Order> {
        self.update_with_image(id, OrderPatch::new(), source)
    }

    /// Store image bytes in the managed directory and attach them.
    pub fn attach_image_bytes(&self, id: i64, bytes: &[u8]) -> Result<Order> {
        self.get(id)?;
        let stored = self.images.import_bytes(bytes)?;
        self.with_imported(stored, |path| {
            self.update(id, OrderPatch::new().image_path(Some(path)))
        })
    }

    /// Insert an order together with a screenshot.
    ///
    /// The image is checked and copied before the row is written, so an
    /// unreadable or unsupported file leaves the database untouched.
    pub fn insert_with_image(&self, draft: OrderDraft, source: &Path) -> Result<Order> {
        draft.validate()?;
        let stored = self.images.import_file(source)?;
        self.with_imported(stored, |path| self.insert(draft.with_image_path(path)))
    }

    /// Apply a patch and attach a screenshot in a single write.
    pub fn update_with_image(&self, id: i64, patch: OrderPatch, source: &Path) -> Result<Order> {
        patch.validate()?;
        self.get(id)?;
        let stored = self.images.import_file(source)?;
        self.with_imported(stored, |path| self.update(id, patch.image_path(Some(path))))
    }

    fn with_imported<F>(&self, stored: PathBuf, write: F) -> Result<Order>
    where
        F: FnOnce(PathBuf) -> Result<Order>,
    {
        match write(stored.clone()) {
            Ok(order) => Ok(order),
            Err(e) => {
                // The copy is orphaned if the row could not be written.
                if let Err(cleanup) = self.images.remove(&stored) {
                    warn!("Failed to remove orphaned image {}: {}", stored.display(), cleanup);
                }
                Err(e)
            }
        }
    }

    fn discard_image(&self, path: &Path, retention: ImageRetention) {
        if retention == ImageRetention::Keep {
            return;
        }

        if let Err(e) = self.images.remove(path) {
            warn!("Failed to remove image {}: {}", path.display(), e);
        }
    }
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    let image_path: Option<String> = row.get(3)?;

    Ok(Order {
        id: row.get(0)?,
        order_number: row.get(1)?,
        amount: from_cents(row.get(2)?),
        image_path: image_path.map(PathBuf::from),
        note: row.get(4)?,
        comment_with_picture: row.get(5)?,
        commented: row.get(6)?,
        revealed: row.get(7)?,
        reimbursed: row.get(8)?,
        reimbursed_amount: from_cents(row.get(9)?),
        created_at: parse_timestamp(row, 10)?,
        updated_at: parse_timestamp(row, 11)?,
    })
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn path_to_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Current time at the precision the database stores.
fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A timestamp strictly after `previous`.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = timestamp_now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn test_store(dir: &tempfile::TempDir, retention: ImageRetention) -> OrderStore {
        OrderStore::open(
            &dir.path().join("orders.db"),
            ImageStore::new(dir.path().join("images")),
            StoreOptions {
                image_retention: retention,
            },
        )
        .unwrap()
    }

    fn memory_store() -> OrderStore {
        OrderStore::open_in_memory(ImageStore::new("unused-images")).unwrap()
    }

    #[test]
    fn test_insert_roundtrip() {
        let store = memory_store();
        let draft = OrderDraft::new("123-4567890-1234567", dec("99.99"))
            .with_note("USB cables")
            .with_commented(true)
            .with_revealed(true)
            .with_image_path("path/to/test/image.jpg")
            .with_reimbursed_amount(dec("10.50"));

        let inserted = store.insert(draft.clone()).unwrap();
        let all = store.list_all().unwrap();

        assert_eq!(all.len(), 1);
        let order = &all[0];
        assert_eq!(order, &inserted);
        assert_eq!(order.order_number, draft.order_number);
        assert_eq!(order.amount, draft.amount);
        assert_eq!(order.note, draft.note);
        assert_eq!(order.image_path, draft.image_path);
        assert_eq!(order.commented, draft.commented);
        assert_eq!(order.revealed, draft.revealed);
        assert_eq!(order.reimbursed, draft.reimbursed);
        assert_eq!(order.comment_with_picture, draft.comment_with_picture);
        assert_eq!(order.reimbursed_amount, draft.reimbursed_amount);
        assert_eq!(order.created_at, order.updated_at);
    }

    #[test]
    fn test_insert_amount_validation() {
        let store = memory_store();

        let err = store
            .insert(OrderDraft::new("123-4567890-1234567", dec("-5.00")))
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation { .. }));
        assert_eq!(store.count().unwrap(), 0);

        let order = store
            .insert(OrderDraft::new("123-4567890-1234567", dec("0.00")))
            .unwrap();
        assert_eq!(order.amount, Decimal::ZERO);
    }

    #[test]
    fn test_insert_rejects_blank_order_number() {
        let store = memory_store();
        let err = store.insert(OrderDraft::new("", dec("1.00"))).unwrap_err();
        assert!(matches!(err, OrderError::Validation { ref field, .. } if field == "order_number"));
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let store = memory_store();
        let ids: Vec<i64> = (1..=3)
            .map(|i| {
                store
                    .insert(OrderDraft::new(format!("ORDER-{i}"), Decimal::from(i * 10)))
                    .unwrap()
                    .id
            })
            .collect();

        let listed: Vec<i64> = store.list_all().unwrap().iter().map(|o| o.id).collect();
        assert_eq!(listed, ids);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_update_patches_only_given_fields() {
        let store = memory_store();
        let original = store
            .insert(OrderDraft::new("123-4567890-1234567", dec("99.99")).with_note("keep me"))
            .unwrap();

        let updated = store
            .update(
                original.id,
                OrderPatch::new()
                    .amount(dec("199.99"))
                    .commented(true)
                    .reimbursed(true)
                    .reimbursed_amount(dec("199.99")),
            )
            .unwrap();

        assert_eq!(updated.amount, dec("199.99"));
        assert!(updated.commented);
        assert!(updated.reimbursed);
        assert_eq!(updated.reimbursed_amount, dec("199.99"));
        assert_eq!(updated.order_number, original.order_number);
        assert_eq!(updated.note, original.note);
        assert!(!updated.revealed);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at > original.updated_at);

        assert_eq!(store.get(original.id).unwrap(), updated);
    }

    #[test]
    fn test_updated_at_strictly_increases() {
        let store = memory_store();
        let mut last = store.insert(OrderDraft::new("A", dec("1.00"))).unwrap();

        for _ in 0..20 {
            let next = store.update(last.id, OrderPatch::new()).unwrap();
            assert!(next.updated_at > last.updated_at);
            last = next;
        }
    }

    #[test]
    fn test_update_clears_note() {
        let store = memory_store();
        let order = store
            .insert(OrderDraft::new("A", dec("1.00")).with_note("temp"))
            .unwrap();

        let updated = store.update(order.id, OrderPatch::new().note(None)).unwrap();
        assert_eq!(updated.note, None);
    }

    #[test]
    fn test_update_unknown_id() {
        let store = memory_store();
        let err = store
            .update(999, OrderPatch::new().commented(true))
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(999)));
    }

    #[test]
    fn test_update_invalid_patch_writes_nothing() {
        let store = memory_store();
        let order = store.insert(OrderDraft::new("A", dec("1.00"))).unwrap();

        let err = store
            .update(order.id, OrderPatch::new().commented(true).amount(dec("-1")))
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation { .. }));
        assert_eq!(store.get(order.id).unwrap(), order);
    }

    #[test]
    fn test_delete_then_not_found() {
        let store = memory_store();
        let order = store.insert(OrderDraft::new("A", dec("1.00"))).unwrap();

        store.delete(order.id).unwrap();

        assert!(matches!(store.get(order.id), Err(OrderError::NotFound(_))));
        assert!(matches!(store.delete(order.id), Err(OrderError::NotFound(_))));
        assert!(matches!(
            store.update(order.id, OrderPatch::new()),
            Err(OrderError::NotFound(_))
        ));
        assert!(matches!(
            store.attach_image_bytes(order.id, PNG_MAGIC),
            Err(OrderError::NotFound(_))
        ));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = memory_store();
        let first = store.insert(OrderDraft::new("A", dec("1.00"))).unwrap();
        store.delete(first.id).unwrap();
        let second = store.insert(OrderDraft::new("B", dec("1.00"))).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_search_by_order_number() {
        let store = memory_store();
        let a = store
            .insert(OrderDraft::new("112-4567890-1234567", dec("25.99")))
            .unwrap();
        let b = store
            .insert(OrderDraft::new("113-1234567-8901234", dec("75.50")))
            .unwrap();
        let c = store.insert(OrderDraft::new("Gift-ABC", dec("5.00"))).unwrap();

        let ids = |orders: Vec<Order>| orders.iter().map(|o| o.id).collect::<Vec<_>>();

        assert_eq!(ids(store.search_by_order_number("4567").unwrap()), vec![a.id, b.id]);
        assert_eq!(ids(store.search_by_order_number("113-").unwrap()), vec![b.id]);
        assert_eq!(ids(store.search_by_order_number("gift-abc").unwrap()), vec![c.id]);
        assert_eq!(ids(store.search_by_order_number("  ").unwrap()), vec![a.id, b.id, c.id]);
        assert_eq!(ids(store.search_by_order_number("").unwrap()), vec![a.id, b.id, c.id]);
        assert!(store.search_by_order_number("999").unwrap().is_empty());
    }

    #[test]
    fn test_every_substring_finds_order() {
        let store = memory_store();
        let order = store
            .insert(OrderDraft::new("113-2089298-0236240", dec("16.15")))
            .unwrap();
        store.insert(OrderDraft::new("other", dec("1.00"))).unwrap();

        let number = order.order_number.clone();
        for start in 0..number.len() {
            for end in start + 1..=number.len() {
                let found = store.search_by_order_number(&number[start..end]).unwrap();
                assert!(
                    found.iter().any(|o| o.id == order.id),
                    "substring {:?} missed",
                    &number[start..end]
                );
            }
        }
    }

    #[test]
    fn test_search_by_amount_tolerance() {
        let store = memory_store();
        let order = store.insert(OrderDraft::new("A", dec("45.67"))).unwrap();

        for target in ["45.67", "43.67", "47.67", "44.00", "47.00", "46.995"] {
            let found = store.search_by_amount(dec(target)).unwrap();
            assert_eq!(found.len(), 1, "target {target}");
            assert_eq!(found[0].id, order.id);
        }

        for target in ["43.66", "47.68", "0", "100"] {
            assert!(
                store.search_by_amount(dec(target)).unwrap().is_empty(),
                "target {target}"
            );
        }
    }

    #[test]
    fn test_search_by_amount_natural_order() {
        let store = memory_store();
        let first = store.insert(OrderDraft::new("A", dec("10.00"))).unwrap();
        store.insert(OrderDraft::new("B", dec("50.00"))).unwrap();
        let third = store.insert(OrderDraft::new("C", dec("11.50"))).unwrap();

        let found = store.search_by_amount(dec("10.75")).unwrap();
        let ids: Vec<i64> = found.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);

        let wide = store
            .search_by_amount_within(dec("30"), dec("25"))
            .unwrap();
        assert_eq!(wide.len(), 3);
        assert!(store.search_by_amount_within(dec("30"), dec("-1")).is_err());
    }

    #[test]
    fn test_list_sorted() {
        let store = memory_store();
        store.insert(OrderDraft::new("b-order", dec("20.00"))).unwrap();
        store.insert(OrderDraft::new("A-order", dec("5.00"))).unwrap();
        store.insert(OrderDraft::new("c-order", dec("12.00"))).unwrap();

        let numbers = |sort| {
            store
                .list_sorted(sort)
                .unwrap()
                .into_iter()
                .map(|o| o.order_number)
                .collect::<Vec<_>>()
        };

        assert_eq!(numbers(OrderSort::IdAsc), vec!["b-order", "A-order", "c-order"]);
        assert_eq!(numbers(OrderSort::AmountAsc), vec!["A-order", "c-order", "b-order"]);
        assert_eq!(numbers(OrderSort::AmountDesc), vec!["b-order", "c-order", "A-order"]);
        assert_eq!(numbers(OrderSort::OrderNumber), vec!["A-order", "b-order", "c-order"]);
        assert_eq!(numbers(OrderSort::CreatedDesc), vec!["c-order", "A-order", "b-order"]);
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let store = test_store(&dir, ImageRetention::Keep);
            store.insert(OrderDraft::new("A", dec("3.30"))).unwrap().id
        };

        let reopened = test_store(&dir, ImageRetention::Keep);
        reopened.verify_schema().unwrap();
        assert_eq!(reopened.get(id).unwrap().amount, dec("3.30"));
    }

    #[test]
    fn test_attach_image_and_keep_on_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir, ImageRetention::Keep);
        let source = dir.path().join("screenshot.png");
        std::fs::write(&source, PNG_MAGIC).unwrap();

        let order = store.insert(OrderDraft::new("A", dec("1.00"))).unwrap();
        let attached = store.attach_image(order.id, &source).unwrap();
        let stored = attached.image_path.clone().unwrap();

        assert!(store.images().contains(&stored));
        assert!(stored.exists());
        assert!(attached.updated_at > order.updated_at);

        store.delete(order.id).unwrap();
        assert!(stored.exists());
    }

    #[test]
    fn test_delete_removes_image_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir, ImageRetention::Delete);

        let order = store.insert(OrderDraft::new("A", dec("1.00"))).unwrap();
        let stored = store
            .attach_image_bytes(order.id, PNG_MAGIC)
            .unwrap()
            .image_path
            .unwrap();

        store.delete(order.id).unwrap();
        assert!(!stored.exists());
    }

    #[test]
    fn test_delete_with_retention_override() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir, ImageRetention::Keep);

        let order = store.insert(OrderDraft::new("A", dec("1.00"))).unwrap();
        let stored = store
            .attach_image_bytes(order.id, PNG_MAGIC)
            .unwrap()
            .image_path
            .unwrap();

        store
            .delete_with_retention(order.id, ImageRetention::Delete)
            .unwrap();
        assert!(!stored.exists());
    }

    #[test]
    fn test_replacing_image_discards_old_copy() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir, ImageRetention::Delete);

        let order = store.insert(OrderDraft::new("A", dec("1.00"))).unwrap();
        let first = store
            .attach_image_bytes(order.id, PNG_MAGIC)
            .unwrap()
            .image_path
            .unwrap();
        let second = store
            .attach_image_bytes(order.id, PNG_MAGIC)
            .unwrap()
            .image_path
            .unwrap();

        assert_ne!(first, second);
        assert!(!first.exists());
        assert!(second.exists());
    }

    #[test]
    fn test_attach_unsupported_image() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir, ImageRetention::Keep);
        let order = store.insert(OrderDraft::new("A", dec("1.00"))).unwrap();

        let err = store.attach_image_bytes(order.id, b"not an image").unwrap_err();
        assert!(matches!(err, OrderError::Validation { .. }));
        assert_eq!(store.get(order.id).unwrap().image_path, None);
    }

    #[test]
    fn test_insert_with_unsupported_image_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir, ImageRetention::Keep);
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "Order #123-4567890-1234567").unwrap();

        let err = store
            .insert_with_image(OrderDraft::new("A", dec("1.00")), &notes)
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation { .. }));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_with_image() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir, ImageRetention::Keep);
        let source = dir.path().join("screenshot.png");
        std::fs::write(&source, PNG_MAGIC).unwrap();

        let order = store
            .insert_with_image(OrderDraft::new("A", dec("1.00")), &source)
            .unwrap();
        let stored = order.image_path.unwrap();
        assert!(store.images().contains(&stored));
        assert!(stored.exists());
    }

    #[test]
    fn test_insert_with_image_invalid_draft_copies_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir, ImageRetention::Keep);
        let source = dir.path().join("screenshot.png");
        std::fs::write(&source, PNG_MAGIC).unwrap();

        let err = store
            .insert_with_image(OrderDraft::new("  ", dec("1.00")), &source)
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation { .. }));
        assert!(!store.images().dir().exists());
    }

    #[test]
    fn test_update_with_unsupported_image_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir, ImageRetention::Keep);
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "plain text").unwrap();
        let order = store.insert(OrderDraft::new("A", dec("1.00"))).unwrap();

        let err = store
            .update_with_image(order.id, OrderPatch::new().order_number("B"), &notes)
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation { .. }));
        assert_eq!(store.get(order.id).unwrap(), order);
    }

    #[test]
    fn test_delete_keeps_file_reached_through_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir, ImageRetention::Delete);
        let outside = dir.path().join("outside.png");
        std::fs::write(&outside, PNG_MAGIC).unwrap();

        let escape = store.images().dir().join("..").join("outside.png");
        let order = store
            .insert(OrderDraft::new("A", dec("1.00")).with_image_path(escape))
            .unwrap();

        store.delete(order.id).unwrap();
        assert!(outside.exists());
    }

    #[test]
    fn test_delete_all() {
        let store = memory_store();
        store.insert(OrderDraft::new("A", dec("1.00"))).unwrap();
        store.insert(OrderDraft::new("B", dec("2.00"))).unwrap();

        assert_eq!(store.delete_all().unwrap(), 2);
        assert_eq!(store.count().unwrap(), 0);
    }
}
