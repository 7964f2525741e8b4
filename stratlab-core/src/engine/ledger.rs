//! Broker ledger: cash, the single position, commission, equity.
//!
//! The ledger is the only place cash and position change. The simulator
//! asks it whether an entry is affordable, then applies fills; everything
//! else reads it.

use chrono::NaiveDateTime;

use super::state::RejectReason;
use crate::domain::{Fill, OrderDirection, OrderId, OrderSide, Position};

/// Slack allowed when comparing a debit against available cash.
///
/// `AllCash` sizing divides and multiplies back, so the resulting debit can
/// land a few ULPs above cash.
pub const CASH_TOLERANCE: f64 = 1e-6;

/// Where a fill happened; copied onto the returned [`Fill`].
#[derive(Debug, Clone, Copy)]
pub struct FillStamp {
    pub order_id: OrderId,
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    cash: f64,
    position: Position,
    commission_paid: f64,
    realized_pnl: f64,
}

impl Ledger {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            position: Position::flat(),
            commission_paid: 0.0,
            realized_pnl: 0.0,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn commission_paid(&self) -> f64 {
        self.commission_paid
    }

    /// Price PnL realized by closing fills, before commission.
    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    /// Equity snapshot at `close`. Read-only.
    pub fn mark_to_market(&self, close: f64) -> f64 {
        self.cash + self.position.market_value(close)
    }

    pub fn unrealized_pnl(&self, close: f64) -> f64 {
        self.position.unrealized_pnl(close)
    }

    /// Check that opening `size` units at `price` fits in available cash.
    ///
    /// The requirement is `size * price * (1 + commission_rate)` for either
    /// entry side: there is no margin, so a short must be collateralized in full.
    pub fn can_afford(&self, size: f64, price: f64, commission_rate: f64) -> Result<(), RejectReason> {
        let required = size * price * (1.0 + commission_rate);
        if required > self.cash + CASH_TOLERANCE {
            return Err(RejectReason::InsufficientFunds {
                required,
                available: self.cash,
            });
        }
        Ok(())
    }

    /// Apply a fill and return its record.
    ///
    /// `Buy` and `Sell` move the position by `size` in their direction;
    /// `Close` flattens the whole position and ignores `size`. Buying debits
    /// `notional + commission`, selling credits `notional - commission`.
    pub fn apply_fill(
        &mut self,
        direction: OrderDirection,
        size: f64,
        price: f64,
        commission_rate: f64,
        stamp: FillStamp,
    ) -> Fill {
        let (side, qty) = match direction {
            OrderDirection::Buy => (OrderSide::Buy, size),
            OrderDirection::Sell => (OrderSide::Sell, size),
            OrderDirection::Close => {
                let side = if self.position.is_short() {
                    OrderSide::Buy
                } else {
                    OrderSide::Sell
                };
                (side, self.position.size.abs())
            }
        };

        let notional = qty * price;
        let commission = notional * commission_rate;
        let delta = match side {
            OrderSide::Buy => qty,
            OrderSide::Sell => -qty,
        };

        match side {
            OrderSide::Buy => self.cash -= notional + commission,
            OrderSide::Sell => self.cash += notional - commission,
        }
        if self.cash < 0.0 && self.cash > -CASH_TOLERANCE {
            self.cash = 0.0;
        }
        self.commission_paid += commission;

        self.update_position(delta, price, stamp.timestamp);

        Fill {
            order_id: stamp.order_id,
            bar_index: stamp.bar_index,
            timestamp: stamp.timestamp,
            side,
            price,
            size: qty,
            commission,
            cash_after: self.cash,
            equity_after: self.mark_to_market(price),
        }
    }

    fn update_position(&mut self, delta: f64, price: f64, timestamp: NaiveDateTime) {
        let old = self.position.size;
        let new = old + delta;
        let pos = &mut self.position;

        if old == 0.0 || old.signum() == delta.signum() {
            // Opening or adding: weighted average entry.
            let total = old.abs() + delta.abs();
            pos.avg_entry_price = if total > 0.0 {
                (pos.avg_entry_price * old.abs() + price * delta.abs()) / total
            } else {
                0.0
            };
            if old == 0.0 {
                pos.opened_at = Some(timestamp);
            }
            pos.size = new;
            return;
        }

        // Reducing: realize PnL on the closed portion.
        let closed = delta.abs().min(old.abs());
        self.realized_pnl += (price - pos.avg_entry_price) * closed * old.signum();

        if new.abs() < 1e-12 || new.signum() != old.signum() {
            // Positions never flip in one fill here; anything left over is
            // rounding dust, so flatten.
            *pos = Position::flat();
        } else {
            pos.size = new;
        }
    }
}
