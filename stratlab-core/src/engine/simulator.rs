//! Bar-by-bar execution simulator.
//!
//! Per bar `t`:
//! 1. Start-of-bar: resolve the order created on `t-1` at `bars[t].open`
//! 2. Decision: consult the policy, turn its action into a pending order
//! 3. Terminal: on the last bar, liquidate at the close
//! 4. Post-bar: mark-to-market at the close
//!
//! Strategy-driven fills always happen at the open of the bar after the
//! decision bar. The only close-price fill is the end-of-data liquidation.

use tracing::debug;

use super::events::{EventKind, RunEvent};
use super::ledger::{FillStamp, Ledger};
use super::state::{EngineConfig, EquityPoint, ExecutionState, Rejection, RunResult};
use crate::domain::{
    Bar, Fill, OpenTrade, Order, OrderDirection, OrderId, OrderSize, PositionSide, PriceSeries,
    Trade, TradeExit,
};
use crate::indicators::{precompute_indicators, IndicatorValues};
use crate::strategy::{Action, PolicyContext, StrategyPolicy};

/// Run `strategy` over `series` and collect trades, equity, and events.
///
/// Deterministic: no wall clock, no randomness.
pub fn run_simulation(
    series: &PriceSeries,
    strategy: &dyn StrategyPolicy,
    config: &EngineConfig,
) -> RunResult {
    let bars = series.bars();
    let indicators = precompute_indicators(bars, &strategy.indicators());

    let mut session = Session::new(series.symbol(), config);
    for (t, bar) in bars.iter().enumerate() {
        session.step(t, bar, t + 1 == bars.len(), strategy, &indicators);
    }

    debug!(
        strategy = strategy.name(),
        symbol = series.symbol(),
        bars = bars.len(),
        trades = session.trades.len(),
        rejections = session.rejections.len(),
        "simulation finished"
    );

    let final_equity = session
        .equity_curve
        .last()
        .map(|p| p.equity)
        .unwrap_or(config.initial_cash);

    RunResult {
        strategy: strategy.name().to_string(),
        symbol: series.symbol().to_string(),
        config: config.clone(),
        final_cash: session.ledger.cash(),
        final_equity,
        bar_count: bars.len(),
        equity_curve: session.equity_curve,
        fills: session.fills,
        trades: session.trades,
        rejections: session.rejections,
        events: session.events,
    }
}

/// Mutable state owned by one run.
struct Session<'a> {
    symbol: &'a str,
    commission_rate: f64,
    ledger: Ledger,
    state: ExecutionState,
    open_trade: Option<OpenTrade>,
    next_order_id: u64,
    next_trade_ref: u64,
    equity_curve: Vec<EquityPoint>,
    fills: Vec<Fill>,
    trades: Vec<Trade>,
    rejections: Vec<Rejection>,
    events: Vec<RunEvent>,
}

impl<'a> Session<'a> {
    fn new(symbol: &'a str, config: &EngineConfig) -> Self {
        Self {
            symbol,
            commission_rate: config.commission_rate,
            ledger: Ledger::new(config.initial_cash),
            state: ExecutionState::Flat,
            open_trade: None,
            next_order_id: 1,
            next_trade_ref: 1,
            equity_curve: Vec::new(),
            fills: Vec::new(),
            trades: Vec::new(),
            rejections: Vec::new(),
            events: Vec::new(),
        }
    }

    fn step(
        &mut self,
        t: usize,
        bar: &Bar,
        is_last: bool,
        strategy: &dyn StrategyPolicy,
        indicators: &IndicatorValues,
    ) {
        // ─── Start-of-bar ───
        match std::mem::replace(&mut self.state, ExecutionState::Flat) {
            ExecutionState::PendingEntry(order) => self.fill_entry(order, t, bar),
            ExecutionState::PendingExit(order) => self.fill_exit(order.id, t, bar, bar.open, false),
            other => self.state = other,
        }

        // ─── Decision ───
        let ctx = PolicyContext {
            bar_index: t,
            bar,
            position: self.ledger.position(),
            cash: self.ledger.cash(),
            is_last_bar: is_last,
        };
        let action = strategy.decide(&ctx, indicators);
        self.submit(action, t, bar, is_last);

        // ─── Terminal ───
        if is_last && matches!(self.state, ExecutionState::Long | ExecutionState::Short) {
            let id = self.order_id();
            self.fill_exit(id, t, bar, bar.close, true);
        }

        // ─── Post-bar ───
        self.equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            equity: self.ledger.mark_to_market(bar.close),
        });
    }

    /// Validate a policy action and queue it for the next bar.
    fn submit(&mut self, action: Action, t: usize, bar: &Bar, is_last: bool) {
        let direction = match action {
            Action::Hold => return,
            Action::Buy(_) => OrderDirection::Buy,
            Action::Sell(_) => OrderDirection::Sell,
            Action::Close => OrderDirection::Close,
        };

        match action {
            Action::Buy(size) | Action::Sell(size) => {
                if self.state != ExecutionState::Flat {
                    return self.ignore(action, t, bar, "position already open");
                }
                if let OrderSize::Units(units) = size {
                    if units.is_nan() || units <= 0.0 {
                        return self.ignore(action, t, bar, "order size must be positive");
                    }
                }
                if is_last {
                    self.emit(t, bar, EventKind::OrderExpired { direction });
                    return;
                }
                let order = self.new_order(direction, size, t, bar);
                self.state = ExecutionState::PendingEntry(order);
            }
            Action::Close => {
                if self.state == ExecutionState::Flat {
                    return self.ignore(action, t, bar, "no open position");
                }
                // On the last bar the terminal liquidation closes the position.
                if !is_last {
                    let units = OrderSize::Units(self.ledger.position().size.abs());
                    let order = self.new_order(direction, units, t, bar);
                    self.state = ExecutionState::PendingExit(order);
                }
            }
            Action::Hold => {}
        }
    }

    fn fill_entry(&mut self, order: Order, t: usize, bar: &Bar) {
        let price = bar.open;
        let size = order
            .size
            .resolve(self.ledger.cash(), price, self.commission_rate);
        if size.is_nan() || size <= 0.0 {
            self.emit(
                t,
                bar,
                EventKind::OrderCancelled {
                    order_id: order.id,
                    detail: format!("resolved size {size} is not positive"),
                },
            );
            return;
        }

        if let Err(reason) = self.ledger.can_afford(size, price, self.commission_rate) {
            debug!(order = %order.id, bar = t, %reason, "order rejected");
            self.emit(
                t,
                bar,
                EventKind::OrderRejected {
                    order_id: order.id,
                    reason: reason.clone(),
                },
            );
            self.rejections.push(Rejection {
                order_id: order.id,
                bar_index: t,
                timestamp: bar.timestamp,
                reason,
            });
            return;
        }

        let stamp = FillStamp {
            order_id: order.id,
            bar_index: t,
            timestamp: bar.timestamp,
        };
        let fill = self
            .ledger
            .apply_fill(order.direction, size, price, self.commission_rate, stamp);
        self.record_fill(&fill, t, bar, false);

        let side = if order.direction == OrderDirection::Sell {
            PositionSide::Short
        } else {
            PositionSide::Long
        };
        let ref_id = self.next_trade_ref;
        self.next_trade_ref += 1;
        self.open_trade = Some(OpenTrade {
            ref_id,
            symbol: self.symbol.to_string(),
            side,
            size: fill.size,
            open_bar: t,
            open_timestamp: bar.timestamp,
            open_price: fill.price,
            entry_commission: fill.commission,
        });
        self.emit(
            t,
            bar,
            EventKind::TradeOpened {
                ref_id,
                side,
                size: fill.size,
                price: fill.price,
            },
        );
        self.state = match side {
            PositionSide::Long => ExecutionState::Long,
            PositionSide::Short => ExecutionState::Short,
        };
        self.fills.push(fill);
    }

    fn fill_exit(&mut self, order_id: OrderId, t: usize, bar: &Bar, price: f64, forced: bool) {
        let stamp = FillStamp {
            order_id,
            bar_index: t,
            timestamp: bar.timestamp,
        };
        let fill = self.ledger.apply_fill(
            OrderDirection::Close,
            0.0,
            price,
            self.commission_rate,
            stamp,
        );
        self.record_fill(&fill, t, bar, forced);

        if let Some(open) = self.open_trade.take() {
            let trade = open.close(TradeExit {
                bar: t,
                timestamp: bar.timestamp,
                price,
                commission: fill.commission,
                forced,
            });
            self.emit(
                t,
                bar,
                EventKind::TradeClosed {
                    ref_id: trade.ref_id,
                    price,
                    gross_pnl: trade.gross_pnl,
                    net_pnl: trade.net_pnl,
                    bars_held: trade.bars_held,
                    forced,
                },
            );
            self.trades.push(trade);
        }
        self.state = ExecutionState::Flat;
        self.fills.push(fill);
    }

    fn record_fill(&mut self, fill: &Fill, t: usize, bar: &Bar, forced: bool) {
        self.emit(
            t,
            bar,
            EventKind::OrderFilled {
                order_id: fill.order_id,
                side: fill.side,
                size: fill.size,
                price: fill.price,
                commission: fill.commission,
                cash_after: fill.cash_after,
                equity_after: fill.equity_after,
                forced,
            },
        );
    }

    fn new_order(&mut self, direction: OrderDirection, size: OrderSize, t: usize, bar: &Bar) -> Order {
        let order = Order {
            id: self.order_id(),
            direction,
            size,
            created_bar: t,
        };
        self.emit(
            t,
            bar,
            EventKind::OrderCreated {
                order_id: order.id,
                direction,
                size,
            },
        );
        order
    }

    fn order_id(&mut self) -> OrderId {
        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        id
    }

    fn ignore(&mut self, action: Action, t: usize, bar: &Bar, detail: &str) {
        self.emit(
            t,
            bar,
            EventKind::ActionIgnored {
                action,
                detail: detail.to_string(),
            },
        );
    }

    fn emit(&mut self, t: usize, bar: &Bar, kind: EventKind) {
        debug!(bar = t, event = kind.name(), state = self.state.label());
        self.events.push(RunEvent {
            timestamp: bar.timestamp,
            bar_index: t,
            kind,
        });
    }
}
