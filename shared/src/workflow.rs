//! Order workflow planning
//!
//! Creating, cancelling and editing an order are computed here against a
//! [`StockLedger`]: a snapshot of the item rows the workflow touches. The
//! result is an [`OrderPlan`] listing every write the caller has to perform.
//! Planning fails before anything is written, so a failed workflow never
//! leaves partial stock changes behind. A failed plan also leaves the ledger
//! exactly as it was passed in.

use std::collections::{BTreeSet, HashMap, HashSet};

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{OrderItem, OrderLineChange, OrderLineInput, OrderStatus};
use crate::validation::{validate_quantity, MAX_AMOUNT};

/// Business rule failures raised while planning an order workflow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),

    #[error("Item with ID {0} does not exist")]
    ItemNotFound(Uuid),

    #[error("Insufficient stock for item {item_name}. Available: {available}, requested: {requested}")]
    InsufficientStock {
        item_id: Uuid,
        item_name: String,
        available: i32,
        requested: i32,
    },

    #[error("{0}")]
    Conflict(String),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Item row as seen by an order workflow
#[derive(Debug, Clone, PartialEq)]
pub struct StockItem {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

/// Final stock level of an item touched by a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub item_id: Uuid,
    pub stock: i32,
}

/// Snapshot of item rows with running stock levels
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    items: HashMap<Uuid, StockItem>,
    loaded: HashMap<Uuid, i32>,
}

impl StockLedger {
    pub fn new(items: impl IntoIterator<Item = StockItem>) -> Self {
        let items: HashMap<Uuid, StockItem> = items.into_iter().map(|i| (i.id, i)).collect();
        let loaded = items.iter().map(|(id, item)| (*id, item.stock)).collect();
        Self { items, loaded }
    }

    pub fn stock_of(&self, item_id: Uuid) -> Option<i32> {
        self.items.get(&item_id).map(|item| item.stock)
    }

    /// Current catalog price of an item
    pub fn price_of(&self, item_id: Uuid) -> WorkflowResult<Decimal> {
        self.items
            .get(&item_id)
            .map(|item| item.price)
            .ok_or(WorkflowError::ItemNotFound(item_id))
    }

    /// Take `quantity` units of an item, returning its current price.
    ///
    /// Fails without touching the ledger when the stock would go negative.
    pub fn take(&mut self, item_id: Uuid, quantity: i32) -> WorkflowResult<Decimal> {
        let item = self
            .items
            .get_mut(&item_id)
            .ok_or(WorkflowError::ItemNotFound(item_id))?;

        if item.stock < quantity {
            return Err(WorkflowError::InsufficientStock {
                item_id,
                item_name: item.name.clone(),
                available: item.stock,
                requested: quantity,
            });
        }

        item.stock -= quantity;
        Ok(item.price)
    }

    /// Put `quantity` units of an item back into stock
    pub fn restore(&mut self, item_id: Uuid, quantity: i32) -> WorkflowResult<()> {
        let item = self
            .items
            .get_mut(&item_id)
            .ok_or(WorkflowError::ItemNotFound(item_id))?;

        item.stock = item.stock.checked_add(quantity).ok_or_else(|| {
            WorkflowError::Validation(format!("Stock for item {} would overflow", item.name))
        })?;
        Ok(())
    }

    /// Items whose stock differs from the loaded snapshot, ordered by id
    pub fn changes(&self) -> Vec<StockChange> {
        let mut changes: Vec<StockChange> = self
            .items
            .values()
            .filter(|item| self.loaded.get(&item.id) != Some(&item.stock))
            .map(|item| StockChange {
                item_id: item.id,
                stock: item.stock,
            })
            .collect();
        changes.sort_by_key(|change| change.item_id);
        changes
    }
}

/// Line to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewLine {
    pub item_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

/// Existing line to rewrite
#[derive(Debug, Clone, PartialEq)]
pub struct LineUpdate {
    pub id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

/// Every write needed to carry out an order workflow
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlan {
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub inserts: Vec<NewLine>,
    pub updates: Vec<LineUpdate>,
    pub deletes: Vec<Uuid>,
    pub stock: Vec<StockChange>,
}

impl OrderPlan {
    fn empty(status: OrderStatus) -> Self {
        Self {
            status,
            total_amount: Decimal::ZERO,
            inserts: Vec::new(),
            updates: Vec::new(),
            deletes: Vec::new(),
            stock: Vec::new(),
        }
    }
}

/// Sorted, de-duplicated item ids; locking rows in this order avoids deadlocks
pub fn item_ids<I: IntoIterator<Item = Uuid>>(ids: I) -> Vec<Uuid> {
    ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

fn line_amount(price: Decimal, quantity: i32) -> Decimal {
    price * Decimal::from(quantity)
}

fn check_total(total: Decimal) -> WorkflowResult<()> {
    if total > MAX_AMOUNT {
        return Err(WorkflowError::Validation(format!(
            "Order total {} exceeds the largest storable amount",
            total
        )));
    }
    Ok(())
}

/// Run a planner against a copy of the ledger, keeping its changes only on success
fn on_scratch<T>(
    ledger: &mut StockLedger,
    plan: impl FnOnce(&mut StockLedger) -> WorkflowResult<T>,
) -> WorkflowResult<T> {
    let mut scratch = ledger.clone();
    let result = plan(&mut scratch)?;
    *ledger = scratch;
    Ok(result)
}

fn check_quantity(item_id: Uuid, quantity: i32) -> WorkflowResult<()> {
    validate_quantity(quantity)
        .map_err(|msg| WorkflowError::Validation(format!("{} (item {})", msg, item_id)))
}

/// Plan a new PENDING order for the requested lines.
///
/// Lines are processed in order, so several lines for the same item draw on
/// the same running stock.
pub fn plan_creation(lines: &[OrderLineInput], ledger: &mut StockLedger) -> WorkflowResult<OrderPlan> {
    if lines.is_empty() {
        return Err(WorkflowError::Validation(
            "Order must have at least one item".to_string(),
        ));
    }

    on_scratch(ledger, |ledger| {
        let mut plan = OrderPlan::empty(OrderStatus::Pending);

        for line in lines {
            check_quantity(line.item_id, line.quantity)?;
            let price = ledger.take(line.item_id, line.quantity)?;
            plan.total_amount += line_amount(price, line.quantity);
            plan.inserts.push(NewLine {
                item_id: line.item_id,
                quantity: line.quantity,
                price,
            });
        }

        check_total(plan.total_amount)?;
        plan.stock = ledger.changes();
        Ok(plan)
    })
}

/// Plan the cancellation of an order: every line goes back into stock and is
/// removed, and the total drops to zero.
pub fn plan_cancellation(
    current: OrderStatus,
    existing: &[OrderItem],
    ledger: &mut StockLedger,
) -> WorkflowResult<OrderPlan> {
    if current.is_cancelled() {
        return Err(WorkflowError::Conflict("Order is already cancelled".to_string()));
    }

    on_scratch(ledger, |ledger| {
        let mut plan = OrderPlan::empty(OrderStatus::Cancelled);
        for line in existing {
            ledger.restore(line.item_id, line.quantity)?;
            plan.deletes.push(line.id);
        }

        plan.stock = ledger.changes();
        Ok(plan)
    })
}

/// Plan a status change.
///
/// Moving into CANCELLED runs the cancellation plan. A cancelled order
/// accepts no further transition. PENDING and PAID switch freely without
/// stock side effects.
pub fn plan_status_change(
    current: OrderStatus,
    target: OrderStatus,
    existing: &[OrderItem],
    ledger: &mut StockLedger,
) -> WorkflowResult<OrderPlan> {
    match (current, target) {
        (OrderStatus::Cancelled, OrderStatus::Cancelled) => {
            Err(WorkflowError::Conflict("Order is already cancelled".to_string()))
        }
        (OrderStatus::Cancelled, _) => Err(WorkflowError::Conflict(
            "Cannot change the status of a cancelled order".to_string(),
        )),
        (_, OrderStatus::Cancelled) => plan_cancellation(current, existing, ledger),
        (_, status) => {
            let mut plan = OrderPlan::empty(status);
            plan.total_amount = existing.iter().map(OrderItem::subtotal).sum();
            Ok(plan)
        }
    }
}

/// Plan an edit that replaces the order's lines and status.
///
/// Existing lines missing from `requested` are removed and restocked. A
/// requested line whose id matches an existing line is rewritten, charging
/// or restoring only the quantity difference; any other requested line is
/// added. Every surviving line gets the item's current price.
pub fn plan_edit(
    current: OrderStatus,
    target: OrderStatus,
    existing: &[OrderItem],
    requested: &[OrderLineChange],
    ledger: &mut StockLedger,
) -> WorkflowResult<OrderPlan> {
    if current.is_cancelled() {
        return Err(WorkflowError::Conflict("Cannot edit a cancelled order".to_string()));
    }

    if target.is_cancelled() {
        return plan_cancellation(current, existing, ledger);
    }

    let requested_ids: HashSet<Uuid> = requested.iter().filter_map(|line| line.id).collect();
    let existing_by_id: HashMap<Uuid, &OrderItem> =
        existing.iter().map(|line| (line.id, line)).collect();

    on_scratch(ledger, |ledger| {
        let mut plan = OrderPlan::empty(target);

        for line in existing {
            if !requested_ids.contains(&line.id) {
                ledger.restore(line.item_id, line.quantity)?;
                plan.deletes.push(line.id);
            }
        }

        let mut claimed: HashSet<Uuid> = HashSet::new();

        for change in requested {
            check_quantity(change.item_id, change.quantity)?;

            let matched = change
                .id
                .and_then(|id| existing_by_id.get(&id).copied())
                .filter(|line| claimed.insert(line.id));

            match matched {
                Some(line) => {
                    if line.item_id == change.item_id {
                        let delta = change.quantity - line.quantity;
                        if delta > 0 {
                            ledger.take(change.item_id, delta)?;
                        } else if delta < 0 {
                            ledger.restore(change.item_id, -delta)?;
                        }
                    } else {
                        ledger.restore(line.item_id, line.quantity)?;
                        ledger.take(change.item_id, change.quantity)?;
                    }

                    let price = ledger.price_of(change.item_id)?;
                    plan.total_amount += line_amount(price, change.quantity);
                    plan.updates.push(LineUpdate {
                        id: line.id,
                        item_id: change.item_id,
                        quantity: change.quantity,
                        price,
                    });
                }
                None => {
                    let price = ledger.take(change.item_id, change.quantity)?;
                    plan.total_amount += line_amount(price, change.quantity);
                    plan.inserts.push(NewLine {
                        item_id: change.item_id,
                        quantity: change.quantity,
                        price,
                    });
                }
            }
        }

        if plan.updates.is_empty() && plan.inserts.is_empty() {
            return Err(WorkflowError::Validation(
                "Order must have at least one item".to_string(),
            ));
        }

        check_total(plan.total_amount)?;
        plan.stock = ledger.changes();
        Ok(plan)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(stock: i32, price: i64) -> (Uuid, StockLedger) {
        let id = Uuid::new_v4();
        let ledger = StockLedger::new([StockItem {
            id,
            name: "Widget".to_string(),
            price: Decimal::from(price),
            stock,
        }]);
        (id, ledger)
    }

    #[test]
    fn test_take_leaves_ledger_untouched_on_failure() {
        let (id, mut ledger) = ledger_with(2, 1000);
        assert!(ledger.take(id, 3).is_err());
        assert_eq!(ledger.stock_of(id), Some(2));
        assert!(ledger.changes().is_empty());
    }

    #[test]
    fn test_changes_skip_net_zero_items() {
        let (id, mut ledger) = ledger_with(5, 1000);
        ledger.take(id, 2).unwrap();
        ledger.restore(id, 2).unwrap();
        assert!(ledger.changes().is_empty());
    }

    #[test]
    fn test_item_ids_sorted_and_unique() {
        let a = Uuid::from_u128(2);
        let b = Uuid::from_u128(1);
        assert_eq!(item_ids([a, b, a]), vec![b, a]);
    }

    #[test]
    fn test_failed_creation_keeps_earlier_lines_in_stock() {
        let (id, mut ledger) = ledger_with(5, 10);
        let result = plan_creation(
            &[
                OrderLineInput { item_id: id, quantity: 3 },
                OrderLineInput { item_id: id, quantity: 3 },
            ],
            &mut ledger,
        );

        assert!(matches!(result, Err(WorkflowError::InsufficientStock { available: 2, .. })));
        assert_eq!(ledger.stock_of(id), Some(5));
        assert!(ledger.changes().is_empty());
    }

    #[test]
    fn test_total_beyond_storable_amount_is_rejected() {
        let id = Uuid::new_v4();
        let mut ledger = StockLedger::new([StockItem {
            id,
            name: "Widget".to_string(),
            price: MAX_AMOUNT,
            stock: 2,
        }]);

        let result = plan_creation(&[OrderLineInput { item_id: id, quantity: 2 }], &mut ledger);
        assert!(matches!(result, Err(WorkflowError::Validation(_))));
        assert_eq!(ledger.stock_of(id), Some(2));
    }
}
