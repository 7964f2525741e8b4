use crate::domain::order::{OrderId, OrderSide};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Fill record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub side: OrderSide,
    pub price: f64,
    pub size: f64,
    pub commission: f64,
    /// Ledger cash immediately after the fill.
    pub cash_after: f64,
    /// Ledger equity at the fill price immediately after the fill.
    pub equity_after: f64,
}

impl Fill {
    pub fn notional(&self) -> f64 {
        self.price * self.size
    }
}
