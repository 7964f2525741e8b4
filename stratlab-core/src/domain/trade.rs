//! Trade — a round trip from flat to positioned and back to flat.

use super::position::PositionSide;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A trade that has been entered but not yet exited.
///
/// Owned by the simulator while the position is open; consumed by
/// [`OpenTrade::close`] to produce the immutable [`Trade`].
#[derive(Debug, Clone, PartialEq)]
pub struct OpenTrade {
    pub ref_id: u64,
    pub symbol: String,
    pub side: PositionSide,
    pub size: f64,
    pub open_bar: usize,
    pub open_timestamp: NaiveDateTime,
    pub open_price: f64,
    pub entry_commission: f64,
}

/// Exit details handed to [`OpenTrade::close`].
#[derive(Debug, Clone, Copy)]
pub struct TradeExit {
    pub bar: usize,
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub commission: f64,
    pub forced: bool,
}

impl OpenTrade {
    /// Finalize the trade. `net_pnl` is exactly `gross_pnl - commission`.
    pub fn close(self, exit: TradeExit) -> Trade {
        let gross_pnl = (exit.price - self.open_price) * self.size * self.side.sign();
        let commission = self.entry_commission + exit.commission;
        let net_pnl = gross_pnl - commission;
        let value = self.open_price * self.size;
        let pnl_pct = if value != 0.0 {
            net_pnl / value * 100.0
        } else {
            0.0
        };
        Trade {
            ref_id: self.ref_id,
            symbol: self.symbol,
            side: self.side,
            open_bar: self.open_bar,
            open_timestamp: self.open_timestamp,
            open_price: self.open_price,
            close_bar: exit.bar,
            close_timestamp: exit.timestamp,
            close_price: exit.price,
            size: self.size,
            value,
            gross_pnl,
            entry_commission: self.entry_commission,
            exit_commission: exit.commission,
            commission,
            net_pnl,
            pnl_pct,
            bars_held: exit.bar.saturating_sub(self.open_bar),
            forced_close: exit.forced,
        }
    }
}

/// A closed round-trip trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Identification ──
    pub ref_id: u64,
    pub symbol: String,
    pub side: PositionSide,

    // ── Entry ──
    pub open_bar: usize,
    pub open_timestamp: NaiveDateTime,
    pub open_price: f64,

    // ── Exit ──
    pub close_bar: usize,
    pub close_timestamp: NaiveDateTime,
    pub close_price: f64,

    // ── Size ──
    /// Unsigned unit count.
    pub size: f64,
    /// Entry notional (`open_price * size`).
    pub value: f64,

    // ── PnL ──
    pub gross_pnl: f64,
    pub entry_commission: f64,
    pub exit_commission: f64,
    pub commission: f64,
    pub net_pnl: f64,
    /// Net PnL as a percentage of entry notional.
    pub pnl_pct: f64,

    // ── Duration ──
    pub bars_held: usize,

    /// True when the exit was the end-of-data liquidation.
    pub forced_close: bool,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }
}
