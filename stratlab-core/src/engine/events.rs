//! Structured event log emitted by the simulator.
//!
//! Each run returns its events in order; the runner writes them as JSON
//! lines (`{timestamp, bar_index, kind, ...payload}`).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::state::RejectReason;
use crate::domain::{OrderDirection, OrderId, OrderSide, OrderSize, PositionSide};
use crate::strategy::Action;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub timestamp: NaiveDateTime,
    pub bar_index: usize,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    OrderCreated {
        order_id: OrderId,
        direction: OrderDirection,
        size: OrderSize,
    },
    OrderFilled {
        order_id: OrderId,
        side: OrderSide,
        size: f64,
        price: f64,
        commission: f64,
        cash_after: f64,
        equity_after: f64,
        forced: bool,
    },
    OrderRejected {
        order_id: OrderId,
        #[serde(flatten)]
        reason: RejectReason,
    },
    /// Resolved size was not positive at fill time.
    OrderCancelled { order_id: OrderId, detail: String },
    /// Entry decided on the last bar; there is no next open to fill at.
    OrderExpired { direction: OrderDirection },
    ActionIgnored { action: Action, detail: String },
    TradeOpened {
        ref_id: u64,
        side: PositionSide,
        size: f64,
        price: f64,
    },
    TradeClosed {
        ref_id: u64,
        price: f64,
        gross_pnl: f64,
        net_pnl: f64,
        bars_held: usize,
        forced: bool,
    },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::OrderCreated { .. } => "order_created",
            EventKind::OrderFilled { .. } => "order_filled",
            EventKind::OrderRejected { .. } => "order_rejected",
            EventKind::OrderCancelled { .. } => "order_cancelled",
            EventKind::OrderExpired { .. } => "order_expired",
            EventKind::ActionIgnored { .. } => "action_ignored",
            EventKind::TradeOpened { .. } => "trade_opened",
            EventKind::TradeClosed { .. } => "trade_closed",
        }
    }
}
