use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Direction of an open position or a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// +1.0 for long, -1.0 for short.
    pub fn sign(self) -> f64 {
        match self {
            PositionSide::Long => 1.0,
            PositionSide::Short => -1.0,
        }
    }
}

/// Position tracking for the single instrument of a run.
///
/// `size` is signed: positive = long, negative = short, zero = flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub size: f64,
    pub avg_entry_price: f64,
    pub opened_at: Option<NaiveDateTime>,
}

impl Position {
    pub fn flat() -> Self {
        Self {
            size: 0.0,
            avg_entry_price: 0.0,
            opened_at: None,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.size == 0.0
    }

    pub fn is_long(&self) -> bool {
        self.size > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.size < 0.0
    }

    pub fn side(&self) -> Option<PositionSide> {
        if self.is_long() {
            Some(PositionSide::Long)
        } else if self.is_short() {
            Some(PositionSide::Short)
        } else {
            None
        }
    }

    pub fn market_value(&self, current_price: f64) -> f64 {
        self.size * current_price
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        self.size * (current_price - self.avg_entry_price)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::flat()
    }
}
