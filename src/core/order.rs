//! Order business logic - placing, editing, and tracking customer orders.
//!
//! An order is a header row plus an ordered list of line snapshots. The order
//! total is never trusted from storage: every edit path goes through
//! [`OrderDetails::apply_edit`], which rewrites the affected line and then
//! overwrites the total with [`recompute_total`].
//!
//! Writes are guarded by the order's `version` column. An edit reads the order,
//! applies the change in memory, and persists it with a conditional update on the
//! version it read; if another staff member saved first, the write affects no rows
//! and [`Error::StaleOrder`] is returned instead of silently overwriting.

use crate::{
    core::{cart::CartLedger, pricing},
    entities::{Order, OrderItem, order, order_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::{info, instrument, warn};

/// Address stored on pickup orders
pub const PICKUP_ADDRESS: &str = "Самовывоз";

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Preparing,
    Ready,
    Completed,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::New, Self::Preparing, Self::Ready, Self::Completed];

    /// Stored form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
        }
    }

    /// Human-readable label for replies.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Preparing => "Preparing",
            Self::Ready => "Ready for pickup",
            Self::Completed => "Completed",
        }
    }

    /// Active orders still need production.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::New | Self::Preparing)
    }

    const fn step(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Preparing => 1,
            Self::Ready => 2,
            Self::Completed => 3,
        }
    }

    /// Strict lifecycle check: stay put or advance exactly one step.
    ///
    /// Only enforced when the shop is configured with
    /// `strict_status_transitions`; by default staff may set any status.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        let (from, to) = (self.step(), next.step());
        to == from || to == from + 1
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::UnknownStatus {
                value: s.to_string(),
            })
    }
}

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Delivery,
    Pickup,
}

impl DeliveryType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delivery => "delivery",
            Self::Pickup => "pickup",
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "delivery" => Ok(Self::Delivery),
            "pickup" => Ok(Self::Pickup),
            other => Err(Error::Validation {
                message: format!("Unknown delivery type '{other}'"),
            }),
        }
    }
}

/// Snapshot of one ordered product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: i64,
    pub name: String,
    pub variant_name: Option<String>,
    pub price: i64,
    pub weight: String,
    /// Price at checkout; `None` on lines recorded before it was captured
    pub original_price: Option<i64>,
    /// Weight at checkout; `None` on lines recorded before it was captured
    pub original_weight: Option<String>,
    pub quantity: u32,
}

impl OrderLine {
    /// Price × quantity for display, saturating on overflow.
    #[must_use]
    pub fn line_total(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.quantity))
    }

    /// Repricing baseline price, falling back to the current price.
    #[must_use]
    pub fn base_price(&self) -> i64 {
        self.original_price.unwrap_or(self.price)
    }

    /// Repricing baseline weight, falling back to the current weight.
    #[must_use]
    pub fn base_weight(&self) -> &str {
        self.original_weight.as_deref().unwrap_or(&self.weight)
    }

    /// Display name including the variant, e.g. "Сыр (мини)".
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.variant_name {
            Some(variant) => format!("{} ({variant})", self.name),
            None => self.name.clone(),
        }
    }

    fn from_model(model: order_item::Model) -> Result<Self> {
        let quantity = u32::try_from(model.quantity).map_err(|_| Error::InvalidQuantity {
            quantity: model.quantity,
        })?;
        Ok(Self {
            product_id: model.product_id,
            name: model.name,
            variant_name: model.variant_name,
            price: model.price,
            weight: model.weight,
            original_price: model.original_price,
            original_weight: model.original_weight,
            quantity,
        })
    }

    fn to_active_model(&self, order_id: i64, position: i32) -> order_item::ActiveModel {
        order_item::ActiveModel {
            order_id: Set(order_id),
            position: Set(position),
            product_id: Set(self.product_id),
            name: Set(self.name.clone()),
            variant_name: Set(self.variant_name.clone()),
            price: Set(self.price),
            weight: Set(self.weight.clone()),
            original_price: Set(self.original_price),
            original_weight: Set(self.original_weight.clone()),
            quantity: Set(i64::from(self.quantity)),
            ..Default::default()
        }
    }
}

/// A staff edit to one order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEdit {
    /// Set the quantity; must be at least 1
    Quantity(u32),
    /// Set the unit price directly
    Price(i64),
    /// Set the actual weight and reprice from the line's baseline
    Weight(String),
}

/// Sum of price × quantity over `lines`.
///
/// This is the only place an order total is computed.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] with the offending unit price when a line
/// total or the sum does not fit in an `i64`.
pub fn recompute_total(lines: &[OrderLine]) -> Result<i64> {
    lines.iter().try_fold(0_i64, |total, line| {
        line.price
            .checked_mul(i64::from(line.quantity))
            .and_then(|line_total| total.checked_add(line_total))
            .ok_or(Error::InvalidAmount { amount: line.price })
    })
}

fn edit_line(line: &mut OrderLine, edit: LineEdit) -> Result<()> {
    match edit {
        LineEdit::Quantity(0) => return Err(Error::InvalidQuantity { quantity: 0 }),
        LineEdit::Quantity(quantity) => line.quantity = quantity,
        LineEdit::Price(price) if price < 0 => return Err(Error::InvalidAmount { amount: price }),
        LineEdit::Price(price) => line.price = price,
        LineEdit::Weight(weight) => {
            let weight = weight.trim().to_string();
            line.price = pricing::reprice(line.base_price(), line.base_weight(), &weight);
            line.weight = weight;
        }
    }
    Ok(())
}

/// Applies `edit` to the line at `index`, returning the rebuilt lines and their
/// total. The input is left untouched.
///
/// Weight edits reprice from the line's original price and weight, so repeated
/// edits never compound rounding.
///
/// # Errors
/// Returns an error if the index is out of range, the quantity is zero, the
/// price is negative, or the new total overflows.
pub fn apply_line_edit(
    lines: &[OrderLine],
    index: usize,
    edit: LineEdit,
) -> Result<(Vec<OrderLine>, i64)> {
    let mut lines = lines.to_vec();
    let line = lines.get_mut(index).ok_or_else(|| Error::Validation {
        message: format!("No line at position {index}"),
    })?;
    edit_line(line, edit)?;
    let total = recompute_total(&lines)?;
    Ok((lines, total))
}

/// Snapshots cart lines into order lines, capturing the repricing baseline.
#[must_use]
pub fn build_lines(cart: &CartLedger) -> Vec<OrderLine> {
    cart.lines()
        .iter()
        .map(|item| OrderLine {
            product_id: item.product_id,
            name: item.name.clone(),
            variant_name: item.variant_name.clone(),
            price: item.price,
            weight: item.weight.clone(),
            original_price: Some(item.price),
            original_weight: Some(item.weight.clone()),
            quantity: item.quantity,
        })
        .collect()
}

/// An order header with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    pub order: order::Model,
    pub lines: Vec<OrderLine>,
}

impl OrderDetails {
    /// Parsed status of the order.
    ///
    /// # Errors
    /// Returns an error if the stored status is not a known value.
    pub fn status(&self) -> Result<OrderStatus> {
        self.order.status.parse()
    }

    /// Applies `edit` to the line at `index` and recomputes the total.
    ///
    /// # Errors
    /// Returns an error if the index is out of range, the quantity is zero, or
    /// the price is negative. The order is unchanged on error.
    pub fn apply_edit(&mut self, index: usize, edit: LineEdit) -> Result<()> {
        if index >= self.lines.len() {
            return Err(Error::OrderLineNotFound {
                order_id: self.order.id,
                index,
            });
        }
        let (lines, total) = apply_line_edit(&self.lines, index, edit)?;
        self.lines = lines;
        self.order.total = total;
        Ok(())
    }
}

/// Everything needed to record a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub comment: Option<String>,
    pub delivery_type: DeliveryType,
    pub customer_email: Option<String>,
    pub lines: Vec<OrderLine>,
}

async fn load_lines<C>(db: &C, order_id: i64) -> Result<Vec<OrderLine>>
where
    C: ConnectionTrait,
{
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(OrderLine::from_model)
        .collect()
}

async fn write_lines<C>(db: &C, order_id: i64, lines: &[OrderLine]) -> Result<()>
where
    C: ConnectionTrait,
{
    OrderItem::delete_many()
        .filter(order_item::Column::OrderId.eq(order_id))
        .exec(db)
        .await?;

    let mut models = Vec::with_capacity(lines.len());
    for (position, line) in lines.iter().enumerate() {
        let position = i32::try_from(position).map_err(|_| Error::Validation {
            message: "Order has too many lines".to_string(),
        })?;
        models.push(line.to_active_model(order_id, position));
    }
    if !models.is_empty() {
        OrderItem::insert_many(models).exec(db).await?;
    }
    Ok(())
}

fn assemble(rows: Vec<(order::Model, Vec<order_item::Model>)>) -> Result<Vec<OrderDetails>> {
    let mut orders = Vec::with_capacity(rows.len());
    for (order, mut items) in rows {
        items.sort_by_key(|item| item.position);
        let lines = items
            .into_iter()
            .map(OrderLine::from_model)
            .collect::<Result<Vec<_>>>()?;
        orders.push(OrderDetails { order, lines });
    }
    // Newest first
    orders.sort_by(|a, b| b.order.id.cmp(&a.order.id));
    Ok(orders)
}

/// Records a new order with status `new`.
///
/// The id is assigned by the database, the date is the current UTC time, and
/// the total is computed from the lines.
///
/// # Errors
/// Returns an error if the order has no lines or a database operation fails.
#[instrument(skip(db, new_order), fields(customer = %new_order.customer_name))]
pub async fn create_order(db: &DatabaseConnection, new_order: NewOrder) -> Result<OrderDetails> {
    if new_order.lines.is_empty() {
        return Err(Error::EmptyCart);
    }

    let total = recompute_total(&new_order.lines)?;
    let txn = db.begin().await?;

    let header = order::ActiveModel {
        customer_name: Set(new_order.customer_name),
        phone: Set(new_order.phone),
        address: Set(new_order.address),
        comment: Set(new_order.comment),
        total: Set(total),
        delivery_type: Set(new_order.delivery_type.as_str().to_string()),
        status: Set(OrderStatus::New.as_str().to_string()),
        date: Set(chrono::Utc::now()),
        customer_email: Set(new_order.customer_email),
        version: Set(1),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    write_lines(&txn, header.id, &new_order.lines).await?;
    txn.commit().await?;

    info!("Created order {} with total {total}", header.id);
    Ok(OrderDetails {
        order: header,
        lines: new_order.lines,
    })
}

/// Retrieves an order with its lines.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<Option<OrderDetails>> {
    let Some(order) = Order::find_by_id(order_id).one(db).await? else {
        return Ok(None);
    };
    let lines = load_lines(db, order_id).await?;
    Ok(Some(OrderDetails { order, lines }))
}

/// Retrieves every order, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_orders(db: &DatabaseConnection) -> Result<Vec<OrderDetails>> {
    let rows = Order::find().find_with_related(OrderItem).all(db).await?;
    assemble(rows)
}

/// Retrieves orders with one of the given statuses, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_orders_by_status(
    db: &DatabaseConnection,
    statuses: &[OrderStatus],
) -> Result<Vec<OrderDetails>> {
    let rows = Order::find()
        .filter(order::Column::Status.is_in(statuses.iter().map(|s| s.as_str())))
        .find_with_related(OrderItem)
        .all(db)
        .await?;
    assemble(rows)
}

/// Retrieves the orders placed by a logged-in customer, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_orders_for_customer(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Vec<OrderDetails>> {
    let rows = Order::find()
        .filter(order::Column::CustomerEmail.eq(email))
        .find_with_related(OrderItem)
        .all(db)
        .await?;
    assemble(rows)
}

/// Reads an order and rejects it when the caller expected another version.
async fn load_for_update<C>(
    db: &C,
    order_id: i64,
    expected_version: Option<i32>,
) -> Result<OrderDetails>
where
    C: ConnectionTrait,
{
    let order = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    if let Some(expected) = expected_version
        && expected != order.version
    {
        return Err(Error::StaleOrder {
            id: order_id,
            expected,
        });
    }

    let lines = load_lines(db, order_id).await?;
    Ok(OrderDetails { order, lines })
}

/// Persists the header of `details` if the stored version still matches the one
/// it was read at, bumping the version.
async fn save_header<C>(db: &C, details: &mut OrderDetails) -> Result<()>
where
    C: ConnectionTrait,
{
    let read_version = details.order.version;
    let result = Order::update_many()
        .col_expr(order::Column::Status, Expr::value(details.order.status.clone()))
        .col_expr(order::Column::Total, Expr::value(details.order.total))
        .col_expr(order::Column::Version, Expr::value(read_version + 1))
        .filter(order::Column::Id.eq(details.order.id))
        .filter(order::Column::Version.eq(read_version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        warn!(
            "Order {} changed since version {read_version}, rejecting write",
            details.order.id
        );
        return Err(Error::StaleOrder {
            id: details.order.id,
            expected: read_version,
        });
    }

    details.order.version = read_version + 1;
    Ok(())
}

/// Sets the status of an order.
///
/// With `strict` set, only [`OrderStatus::can_transition_to`] moves are allowed.
///
/// # Errors
/// Returns an error if the order does not exist, the version is stale, the
/// transition is rejected, or the update fails.
#[instrument(skip(db))]
pub async fn update_status(
    db: &DatabaseConnection,
    order_id: i64,
    status: OrderStatus,
    expected_version: Option<i32>,
    strict: bool,
) -> Result<OrderDetails> {
    let txn = db.begin().await?;
    let mut details = load_for_update(&txn, order_id, expected_version).await?;

    let current = details.status()?;
    if strict && !current.can_transition_to(status) {
        return Err(Error::InvalidStatusTransition {
            from: current.to_string(),
            to: status.to_string(),
        });
    }

    details.order.status = status.as_str().to_string();
    save_header(&txn, &mut details).await?;
    txn.commit().await?;

    info!("Order {order_id} status {current} -> {status}");
    Ok(details)
}

/// Applies a staff edit to one line of an order and persists the whole order.
///
/// # Errors
/// Returns an error if the order or line does not exist, the edit is invalid,
/// the version is stale, or a database operation fails.
#[instrument(skip(db))]
pub async fn update_line(
    db: &DatabaseConnection,
    order_id: i64,
    index: usize,
    edit: LineEdit,
    expected_version: Option<i32>,
) -> Result<OrderDetails> {
    let txn = db.begin().await?;
    let mut details = load_for_update(&txn, order_id, expected_version).await?;
    let previous_total = details.order.total;

    details.apply_edit(index, edit)?;
    save_header(&txn, &mut details).await?;
    write_lines(&txn, order_id, &details.lines).await?;
    txn.commit().await?;

    if details.order.total != previous_total {
        info!(
            "Order {order_id} total updated: {previous_total} -> {}",
            details.order.total
        );
    }
    Ok(details)
}

/// Deletes an order and its lines.
///
/// # Errors
/// Returns an error if the order does not exist or the delete fails.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    OrderItem::delete_many()
        .filter(order_item::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;
    let result = Order::delete_by_id(order_id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(Error::OrderNotFound { id: order_id });
    }
    txn.commit().await?;
    info!("Deleted order {order_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn line(name: &str, price: i64, weight: &str, quantity: u32) -> OrderLine {
        OrderLine {
            product_id: 1,
            name: name.to_string(),
            variant_name: None,
            price,
            weight: weight.to_string(),
            original_price: Some(price),
            original_weight: Some(weight.to_string()),
            quantity,
        }
    }

    fn details(lines: Vec<OrderLine>) -> OrderDetails {
        OrderDetails {
            order: order::Model {
                id: 7,
                customer_name: "Иван".to_string(),
                phone: "+7 999 123-45-67".to_string(),
                address: "ул. Ленина, 1".to_string(),
                comment: None,
                total: recompute_total(&lines).unwrap(),
                delivery_type: "delivery".to_string(),
                status: "new".to_string(),
                date: chrono::Utc::now(),
                customer_email: None,
                version: 1,
            },
            lines,
        }
    }

    #[test]
    fn test_status_round_trip_and_labels() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!(matches!(
            "shipped".parse::<OrderStatus>(),
            Err(Error::UnknownStatus { .. })
        ));
        assert!(OrderStatus::New.is_active());
        assert!(OrderStatus::Preparing.is_active());
        assert!(!OrderStatus::Ready.is_active());
        assert!(!OrderStatus::Completed.is_active());
    }

    #[test]
    fn test_strict_transition_table() {
        use OrderStatus::{Completed, New, Preparing, Ready};
        assert!(New.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Completed));
        assert!(Ready.can_transition_to(Ready));
        assert!(!New.can_transition_to(Ready));
        assert!(!New.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(New));
        assert!(!Ready.can_transition_to(Preparing));
    }

    #[test]
    fn test_weight_edit_reprices_and_updates_total() {
        let mut order = details(vec![
            line("Сыр сливочный", 450, "300г", 1),
            line("Молоко", 120, "1л", 2),
        ]);
        assert_eq!(order.order.total, 690);

        order.apply_edit(0, LineEdit::Weight("150г".into())).unwrap();
        assert_eq!(order.lines[0].price, 225);
        assert_eq!(order.lines[0].weight, "150г");
        assert_eq!(order.order.total, 225 + 240);
    }

    #[test]
    fn test_weight_edits_always_scale_from_original() {
        let mut order = details(vec![line("Сыр", 450, "300г", 1)]);
        order.apply_edit(0, LineEdit::Weight("150г".into())).unwrap();
        order.apply_edit(0, LineEdit::Weight("600г".into())).unwrap();
        assert_eq!(order.lines[0].price, 900);
    }

    #[test]
    fn test_weight_edit_without_originals_uses_current_values() {
        let mut legacy = line("Сыр", 450, "300г", 2);
        legacy.original_price = None;
        legacy.original_weight = None;
        let mut order = details(vec![legacy]);

        order.apply_edit(0, LineEdit::Weight("100г".into())).unwrap();
        assert_eq!(order.lines[0].price, 150);
        assert_eq!(order.order.total, 300);
    }

    #[test]
    fn test_quantity_and_price_edits_recompute_total() {
        let mut order = details(vec![line("Сыр", 450, "300г", 1), line("Творог", 280, "500г", 1)]);

        order.apply_edit(1, LineEdit::Quantity(3)).unwrap();
        assert_eq!(order.order.total, 450 + 3 * 280);

        order.apply_edit(0, LineEdit::Price(500)).unwrap();
        assert_eq!(order.order.total, 500 + 3 * 280);
        assert_eq!(order.order.total, recompute_total(&order.lines).unwrap());
    }

    #[test]
    fn test_invalid_edits_leave_order_unchanged() {
        let mut order = details(vec![line("Сыр", 450, "300г", 1)]);
        let before = order.clone();

        assert!(matches!(
            order.apply_edit(0, LineEdit::Quantity(0)),
            Err(Error::InvalidQuantity { quantity: 0 })
        ));
        assert!(matches!(
            order.apply_edit(0, LineEdit::Price(-10)),
            Err(Error::InvalidAmount { amount: -10 })
        ));
        assert!(matches!(
            order.apply_edit(5, LineEdit::Quantity(2)),
            Err(Error::OrderLineNotFound {
                order_id: 7,
                index: 5
            })
        ));
        assert_eq!(order, before);
    }

    #[test]
    fn test_apply_line_edit_returns_new_lines_and_total() {
        let lines = vec![line("Сыр", 450, "300г", 1), line("Сметана", 180, "400г", 1)];

        let (edited, total) = apply_line_edit(&lines, 1, LineEdit::Weight("200г".into())).unwrap();
        assert_eq!(edited[1].price, 90);
        assert_eq!(total, 540);
        assert_eq!(lines[1].price, 180);

        assert!(apply_line_edit(&lines, 2, LineEdit::Quantity(1)).is_err());
    }

    #[test]
    fn test_overflowing_edits_are_rejected() {
        let mut order = details(vec![line("Сыр", 450, "300г", 2)]);
        let before = order.clone();

        assert!(matches!(
            order.apply_edit(0, LineEdit::Weight("15000000000000000000000г".into())),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            order.apply_edit(0, LineEdit::Price(i64::MAX / 2 + 1)),
            Err(Error::InvalidAmount { .. })
        ));
        assert_eq!(order, before);

        let lines = vec![line("Сыр", i64::MAX, "300г", 1), line("Молоко", 1, "1л", 1)];
        assert!(matches!(
            recompute_total(&lines),
            Err(Error::InvalidAmount { amount: 1 })
        ));
    }

    #[tokio::test]
    async fn test_create_order_assigns_id_and_total() -> Result<()> {
        let db = setup_test_db().await?;

        let first = create_test_order(&db, vec![line("Сыр", 450, "300г", 2)]).await?;
        let second = create_test_order(&db, vec![line("Молоко", 120, "1л", 1)]).await?;

        assert_ne!(first.order.id, second.order.id);
        assert_eq!(first.order.total, 900);
        assert_eq!(first.order.status, "new");
        assert_eq!(first.order.version, 1);

        let loaded = get_order(&db, first.order.id).await?.unwrap();
        assert_eq!(loaded.lines, first.lines);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_rejects_empty_lines() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_test_order(&db, Vec::new()).await;
        assert!(matches!(result, Err(Error::EmptyCart)));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_line_persists_total_and_bumps_version() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_order(
            &db,
            vec![line("Сыр", 450, "300г", 1), line("Молоко", 120, "1л", 1)],
        )
        .await?;

        let updated = update_line(
            &db,
            created.order.id,
            0,
            LineEdit::Weight("150г".into()),
            Some(1),
        )
        .await?;
        assert_eq!(updated.order.total, 345);
        assert_eq!(updated.order.version, 2);

        let reloaded = get_order(&db, created.order.id).await?.unwrap();
        assert_eq!(reloaded.order.total, 345);
        assert_eq!(reloaded.lines[0].price, 225);
        assert_eq!(reloaded.lines[0].original_price, Some(450));
        assert_eq!(reloaded.lines[1].name, "Молоко");
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_order(&db, vec![line("Сыр", 450, "300г", 1)]).await?;

        update_line(&db, created.order.id, 0, LineEdit::Quantity(2), Some(1)).await?;
        let stale = update_line(&db, created.order.id, 0, LineEdit::Quantity(5), Some(1)).await;
        assert!(matches!(stale, Err(Error::StaleOrder { expected: 1, .. })));

        let reloaded = get_order(&db, created.order.id).await?.unwrap();
        assert_eq!(reloaded.lines[0].quantity, 2);
        assert_eq!(reloaded.order.total, 900);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_permissive_and_strict() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_order(&db, vec![line("Сыр", 450, "300г", 1)]).await?;
        let id = created.order.id;

        // Permissive by default: jump straight to completed and back
        update_status(&db, id, OrderStatus::Completed, None, false).await?;
        let back = update_status(&db, id, OrderStatus::New, None, false).await?;
        assert_eq!(back.status()?, OrderStatus::New);
        assert_eq!(back.order.version, 3);

        let skip = update_status(&db, id, OrderStatus::Ready, None, true).await;
        assert!(matches!(skip, Err(Error::InvalidStatusTransition { .. })));

        let step = update_status(&db, id, OrderStatus::Preparing, None, true).await?;
        assert_eq!(step.status()?, OrderStatus::Preparing);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_order() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_status(&db, 404, OrderStatus::Ready, None, false).await;
        assert!(matches!(result, Err(Error::OrderNotFound { id: 404 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_queries_and_delete() -> Result<()> {
        let db = setup_test_db().await?;
        let mut new_order = new_test_order(vec![line("Сыр", 450, "300г", 1)]);
        new_order.customer_email = Some("anna@example.com".to_string());
        let mine = create_order(&db, new_order).await?;
        let other = create_test_order(&db, vec![line("Молоко", 120, "1л", 1)]).await?;
        update_status(&db, other.order.id, OrderStatus::Completed, None, false).await?;

        let all = get_all_orders(&db).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].order.id, other.order.id);

        let customer = get_orders_for_customer(&db, "anna@example.com").await?;
        assert_eq!(customer.len(), 1);
        assert_eq!(customer[0].order.id, mine.order.id);

        let active = get_orders_by_status(&db, &[OrderStatus::New, OrderStatus::Preparing]).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].lines.len(), 1);

        delete_order(&db, mine.order.id).await?;
        assert!(get_order(&db, mine.order.id).await?.is_none());
        assert!(matches!(
            delete_order(&db, mine.order.id).await,
            Err(Error::OrderNotFound { .. })
        ));
        Ok(())
    }
}
