//! Order data model and field validation.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{OrderError, Result};

/// Largest amount the store accepts (exclusive).
const MAX_WHOLE_UNITS: i64 = 1_000_000_000;

/// A recorded e-commerce order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Store-assigned identifier, stable for the lifetime of the row.
    pub id: i64,

    /// Marketplace order number, usually `ddd-ddddddd-ddddddd`.
    pub order_number: String,

    /// Order total, cent precision.
    pub amount: Decimal,

    /// Attached screenshot inside the managed image directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,

    /// Free-text note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// The review was posted together with a picture.
    pub comment_with_picture: bool,

    /// A review has been posted.
    pub commented: bool,

    /// The review has been revealed (checked).
    pub revealed: bool,

    /// The order has been reimbursed.
    pub reimbursed: bool,

    /// Amount reimbursed so far.
    pub reimbursed_amount: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Names of the status flags that are set, in display order.
    pub fn active_flags(&self) -> Vec<&'static str> {
        let flags = [
            ("picture", self.comment_with_picture),
            ("commented", self.commented),
            ("revealed", self.revealed),
            ("reimbursed", self.reimbursed),
        ];

        flags
            .iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| *name)
            .collect()
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ${:.2}", self.id, self.order_number, self.amount)
    }
}

/// Field values for a new order, before the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub order_number: String,
    pub amount: Decimal,
    pub image_path: Option<PathBuf>,
    pub note: Option<String>,
    pub comment_with_picture: bool,
    pub commented: bool,
    pub revealed: bool,
    pub reimbursed: bool,
    pub reimbursed_amount: Decimal,
}

impl OrderDraft {
    /// Create a draft with all flags cleared.
    pub fn new(order_number: impl Into<String>, amount: Decimal) -> Self {
        Self {
            order_number: order_number.into(),
            amount,
            image_path: None,
            note: None,
            comment_with_picture: false,
            commented: false,
            revealed: false,
            reimbursed: false,
            reimbursed_amount: Decimal::ZERO,
        }
    }

    /// Create a draft from user-typed text, failing fast on a bad amount.
    pub fn parse(order_number: impl Into<String>, amount: &str) -> Result<Self> {
        let amount = parse_amount(amount)?;
        let draft = Self::new(order_number, amount);
        draft.validate()?;
        Ok(draft)
    }

    pub fn with_image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_comment_with_picture(mut self, value: bool) -> Self {
        self.comment_with_picture = value;
        self
    }

    pub fn with_commented(mut self, value: bool) -> Self {
        self.commented = value;
        self
    }

    pub fn with_revealed(mut self, value: bool) -> Self {
        self.revealed = value;
        self
    }

    pub fn with_reimbursed(mut self, value: bool) -> Self {
        self.reimbursed = value;
        self
    }

    pub fn with_reimbursed_amount(mut self, amount: Decimal) -> Self {
        self.reimbursed_amount = amount;
        self
    }

    /// Check every field the store would reject.
    pub fn validate(&self) -> Result<()> {
        validate_order_number(&self.order_number)?;
        validate_money("amount", self.amount)?;
        validate_money("reimbursed_amount", self.reimbursed_amount)?;
        Ok(())
    }
}

/// A partial update. `None` leaves a field untouched.
///
/// Nullable fields use `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub order_number: Option<String>,
    pub amount: Option<Decimal>,
    pub image_path: Option<Option<PathBuf>>,
    pub note: Option<Option<String>>,
    pub comment_with_picture: Option<bool>,
    pub commented: Option<bool>,
    pub revealed: Option<bool>,
    pub reimbursed: Option<bool>,
    pub reimbursed_amount: Option<Decimal>,
}

impl OrderPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_number(mut self, value: impl Into<String>) -> Self {
        self.order_number = Some(value.into());
        self
    }

    pub fn amount(mut self, value: Decimal) -> Self {
        self.amount = Some(value);
        self
    }

    pub fn image_path(mut self, value: Option<PathBuf>) -> Self {
        self.image_path = Some(value);
        self
    }

    pub fn note(mut self, value: Option<String>) -> Self {
        self.note = Some(value);
        self
    }

    pub fn comment_with_picture(mut self, value: bool) -> Self {
        self.comment_with_picture = Some(value);
        self
    }

    pub fn commented(mut self, value: bool) -> Self {
        self.commented = Some(value);
        self
    }

    pub fn revealed(mut self, value: bool) -> Self {
        self.revealed = Some(value);
        self
    }

    pub fn reimbursed(mut self, value: bool) -> Self {
        self.reimbursed = Some(value);
        self
    }

    pub fn reimbursed_amount(mut self, value: Decimal) -> Self {
        self.reimbursed_amount = Some(value);
        self
    }

    /// True if applying the patch would change no field.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validate only the fields present in the patch.
    pub fn validate(&self) -> Result<()> {
        if let Some(order_number) = &self.order_number {
            validate_order_number(order_number)?;
        }
        if let Some(amount) = self.amount {
            validate_money("amount", amount)?;
        }
        if let Some(amount) = self.reimbursed_amount {
            validate_money("reimbursed_amount", amount)?;
        }
        Ok(())
    }

    /// Copy the patched fields onto `order`.
    pub fn apply_to(&self, order: &mut Order) {
        if let Some(value) = &self.order_number {
            order.order_number = value.clone();
        }
        if let Some(value) = self.amount {
            order.amount = value;
        }
        if let Some(value) = &self.image_path {
            order.image_path = value.clone();
        }
        if let Some(value) = &self.note {
            order.note = value.clone();
        }
        if let Some(value) = self.comment_with_picture {
            order.comment_with_picture = value;
        }
        if let Some(value) = self.commented {
            order.commented = value;
        }
        if let Some(value) = self.revealed {
            order.revealed = value;
        }
        if let Some(value) = self.reimbursed {
            order.reimbursed = value;
        }
        if let Some(value) = self.reimbursed_amount {
            order.reimbursed_amount = value;
        }
    }
}

/// Ordering for order listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSort {
    /// Insertion order.
    #[default]
    IdAsc,
    /// Newest first.
    CreatedDesc,
    AmountAsc,
    AmountDesc,
    /// Alphabetical by order number.
    OrderNumber,
}

impl OrderSort {
    /// SQL `ORDER BY` clause body. Ties fall back to id.
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            OrderSort::IdAsc => "id ASC",
            OrderSort::CreatedDesc => "created_at DESC, id DESC",
            OrderSort::AmountAsc => "amount_cents ASC, id ASC",
            OrderSort::AmountDesc => "amount_cents DESC, id ASC",
            OrderSort::OrderNumber => "order_number COLLATE NOCASE ASC, id ASC",
        }
    }
}

/// Parse a user-typed amount such as `45.67`, `$45.67` or `1,234.56`.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    let cleaned: String = trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .trim_start()
        .chars()
        .filter(|c| *c != ',')
        .collect();

    if cleaned.is_empty() {
        return Err(OrderError::validation("amount", "must not be empty"));
    }

    let amount = Decimal::from_str(&cleaned).map_err(|_| {
        OrderError::validation("amount", format!("'{}' is not a decimal number", text.trim()))
    })?;

    validate_money("amount", amount)?;
    Ok(amount)
}

fn validate_order_number(order_number: &str) -> Result<()> {
    if order_number.trim().is_empty() {
        return Err(OrderError::validation("order_number", "must not be empty"));
    }
    Ok(())
}

/// Money fields are non-negative with at most cent precision.
pub(crate) fn validate_money(field: &str, value: Decimal) -> Result<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(OrderError::validation(field, "must not be negative"));
    }
    if value.normalize().scale() > 2 {
        return Err(OrderError::validation(
            field,
            "must have at most two decimal places",
        ));
    }
    if value >= Decimal::from(MAX_WHOLE_UNITS) {
        return Err(OrderError::validation(field, "is too large"));
    }
    Ok(())
}

/// Convert a validated money value to integer cents.
pub(crate) fn to_cents(value: Decimal) -> i64 {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded.mantissa() as i64
}

pub(crate) fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
