//! Orders: transient requests that live from creation until the next bar's open.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential order ID, unique within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the strategy asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    Buy,
    Sell,
    Close,
}

/// Which way cash and units flow on a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Requested order size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderSize {
    /// Explicit number of units.
    Units(f64),
    /// All available cash at the fill price, leaving room for commission.
    AllCash,
}

impl OrderSize {
    /// Resolve to a unit count against the fill price.
    ///
    /// `AllCash` sizes as `cash / (price * (1 + commission_rate))` so the
    /// entry debit including commission equals the available cash.
    pub fn resolve(self, cash: f64, price: f64, commission_rate: f64) -> f64 {
        match self {
            OrderSize::Units(units) => units,
            OrderSize::AllCash => {
                if price <= 0.0 || cash <= 0.0 {
                    0.0
                } else {
                    cash / (price * (1.0 + commission_rate))
                }
            }
        }
    }
}

/// A pending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub direction: OrderDirection,
    pub size: OrderSize,
    pub created_bar: usize,
}
