//! Engine configuration, execution state, and run result types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::events::RunEvent;
use crate::domain::{Fill, Order, OrderId, Trade};

/// Configuration for a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub initial_cash: f64,
    /// Proportional commission on notional, charged on entry and exit fills.
    pub commission_rate: f64,
}

impl EngineConfig {
    pub fn new(initial_cash: f64, commission_rate: f64) -> Self {
        Self {
            initial_cash,
            commission_rate,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(100_000.0, 0.001)
    }
}

/// Per-instrument order lifecycle.
///
/// Pending states exist only between the decision bar and the next bar's
/// open; the policy is never consulted while an order is pending.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionState {
    Flat,
    PendingEntry(Order),
    Long,
    Short,
    PendingExit(Order),
}

impl ExecutionState {
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ExecutionState::PendingEntry(_) | ExecutionState::PendingExit(_)
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExecutionState::Flat => "flat",
            ExecutionState::PendingEntry(_) => "pending_entry",
            ExecutionState::Long => "long",
            ExecutionState::Short => "short",
            ExecutionState::PendingExit(_) => "pending_exit",
        }
    }
}

/// Why an order was refused at fill time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("insufficient funds: required {required:.2}, available {available:.2}")]
    InsufficientFunds { required: f64, available: f64 },
}

/// A rejected order. The run continues; nothing else changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("order {order_id} rejected at bar {bar_index}: {reason}")]
pub struct Rejection {
    pub order_id: OrderId,
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub reason: RejectReason,
}

/// Equity at one bar's close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

/// Result of a complete simulation run.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub strategy: String,
    pub symbol: String,
    pub config: EngineConfig,
    /// Equity at each bar close, one point per bar.
    pub equity_curve: Vec<EquityPoint>,
    pub fills: Vec<Fill>,
    /// Closed round-trip trades in close order.
    pub trades: Vec<Trade>,
    pub rejections: Vec<Rejection>,
    /// Structured event log in emission order.
    pub events: Vec<RunEvent>,
    pub final_equity: f64,
    pub final_cash: f64,
    pub bar_count: usize,
}

impl RunResult {
    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.equity_curve.first().map(|p| p.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.equity_curve.last().map(|p| p.timestamp)
    }

    pub fn equity_values(&self) -> Vec<f64> {
        self.equity_curve.iter().map(|p| p.equity).collect()
    }
}
