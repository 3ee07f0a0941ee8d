//! Status transition engine
//!
//! Pure decision layer: given an order's current status and a requested
//! target, decide whether the transition is legal and which table side
//! effect (if any) it triggers. Side effects are computed here and applied
//! by the session layer; the order and table writes go to independent
//! backend resources with no shared transaction.

use thiserror::Error;

use shared::models::order::{Order, OrderStatus};
use shared::models::table::TableStatus;

/// Transition rejected by the engine
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

/// Table status change that must accompany an order status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEffect {
    pub table_id: i64,
    pub new_status: TableStatus,
}

/// Outcome of a successful transition decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub new_status: OrderStatus,
    pub table_effect: Option<TableEffect>,
}

/// Legal targets for a given status.
///
/// CANCELLED is reachable from every non-terminal state except SERVED
/// (not offered once served). PAID and CANCELLED are terminal.
pub fn allowed_targets(from: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match from {
        Pending => &[Confirmed, Cancelled],
        Confirmed => &[Preparing, Cancelled],
        Preparing => &[Served, Cancelled],
        Served => &[Paid],
        Paid | Cancelled => &[],
    }
}

/// Decide a transition. Computes the side effect, does not apply it.
pub fn attempt_transition(
    order: &Order,
    target: OrderStatus,
) -> Result<Transition, TransitionError> {
    if !allowed_targets(order.status).contains(&target) {
        return Err(TransitionError::InvalidTransition {
            from: order.status,
            to: target,
        });
    }

    Ok(Transition {
        new_status: target,
        table_effect: table_effect(order, target),
    })
}

fn table_effect(order: &Order, target: OrderStatus) -> Option<TableEffect> {
    let table_id = order.table_id?;
    let new_status = match target {
        OrderStatus::Served => TableStatus::Occupied,
        OrderStatus::Paid | OrderStatus::Cancelled => TableStatus::Free,
        _ => return None,
    };
    Some(TableEffect {
        table_id,
        new_status,
    })
}

/// Reason string broadcast with a table side effect.
pub fn effect_reason(target: OrderStatus) -> &'static str {
    match target {
        OrderStatus::Served => "order-served",
        OrderStatus::Paid => "payment-completed",
        OrderStatus::Cancelled => "order-cancelled",
        _ => "order-status-changed",
    }
}
