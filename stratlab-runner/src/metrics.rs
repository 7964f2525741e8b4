//! Performance metrics — pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: equity curve and/or trade list in, scalar out.
//! Metrics that are undefined for the input (too few returns, zero variance,
//! zero elapsed time) are `None` rather than a sentinel number.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use stratlab_core::domain::{PositionSide, Trade};
use stratlab_core::engine::RunResult;

/// Trading days per year used to annualize per-bar Sharpe.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Aggregate performance figures for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub total_trades: usize,
    pub won_trades: usize,
    pub lost_trades: usize,
    pub long_trades: usize,
    pub short_trades: usize,
    /// Percentage of trades with positive net PnL.
    pub win_rate_pct: f64,
    /// Sum of positive net PnL.
    pub gross_profit: f64,
    /// Sum of negative net PnL (zero or negative).
    pub gross_loss: f64,
    pub net_profit: f64,
    pub total_return_pct: f64,
    pub annualized_return_pct: Option<f64>,
    pub sharpe: Option<f64>,
    /// Largest peak-to-trough equity decline, in `[0, 100]`. A decline below
    /// zero equity reads as 100; `total_return_pct` keeps the full loss.
    pub max_drawdown_pct: f64,
    pub sqn: Option<f64>,
    pub final_equity: f64,
    pub rejected_orders: usize,
}

impl PerformanceReport {
    pub fn compute(result: &RunResult) -> Self {
        let equity = result.equity_values();
        let trades = &result.trades;
        let initial = result.config.initial_cash;
        let final_equity = result.final_equity;

        let won_trades = trades.iter().filter(|t| t.is_winner()).count();
        let long_trades = trades
            .iter()
            .filter(|t| t.side == PositionSide::Long)
            .count();
        let total = total_return(initial, final_equity);

        Self {
            total_trades: trades.len(),
            won_trades,
            lost_trades: trades.len() - won_trades,
            long_trades,
            short_trades: trades.len() - long_trades,
            win_rate_pct: win_rate(trades) * 100.0,
            gross_profit: gross_profit(trades),
            gross_loss: gross_loss(trades),
            net_profit: trades.iter().map(|t| t.net_pnl).sum(),
            total_return_pct: total * 100.0,
            annualized_return_pct: match (result.first_timestamp(), result.last_timestamp()) {
                (Some(first), Some(last)) => annualized_return(total, first, last).map(|r| r * 100.0),
                _ => None,
            },
            sharpe: sharpe_ratio(&equity),
            max_drawdown_pct: max_drawdown_pct(&equity),
            sqn: sqn(trades),
            final_equity,
            rejected_orders: result.rejections.len(),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: final / initial − 1.
pub fn total_return(initial: f64, final_equity: f64) -> f64 {
    if initial <= 0.0 {
        return 0.0;
    }
    final_equity / initial - 1.0
}

/// Geometric annualization over calendar time: `(1 + total)^(365 / days) − 1`.
///
/// `None` when no time elapsed. A run that lost everything (or more, after
/// a short squeeze) annualizes to −100%.
pub fn annualized_return(
    total: f64,
    first: NaiveDateTime,
    last: NaiveDateTime,
) -> Option<f64> {
    let days = (last - first).num_seconds() as f64 / 86_400.0;
    if days <= 0.0 {
        return None;
    }
    let growth = 1.0 + total;
    if growth <= 0.0 {
        return Some(-1.0);
    }
    Some(growth.powf(365.0 / days) - 1.0)
}

/// Annualized Sharpe ratio from per-bar returns, zero risk-free rate.
///
/// Sharpe = mean(returns) / std(returns) * sqrt(252), sample deviation.
pub fn sharpe_ratio(equity_curve: &[f64]) -> Option<f64> {
    let returns = bar_returns(equity_curve);
    if returns.len() < 2 {
        return None;
    }
    let std = std_dev(&returns);
    if std < 1e-15 {
        return None;
    }
    Some(mean_f64(&returns) / std * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Maximum drawdown as a positive percentage of the running peak.
///
/// Returns 0.0 if equity is constant or monotonically increasing.
pub fn max_drawdown_pct(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (peak - eq) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    (max_dd * 100.0).clamp(0.0, 100.0)
}

/// System Quality Number: mean / std of net trade PnL × √n.
pub fn sqn(trades: &[Trade]) -> Option<f64> {
    if trades.len() < 2 {
        return None;
    }
    let pnl: Vec<f64> = trades.iter().map(|t| t.net_pnl).collect();
    let std = std_dev(&pnl);
    if std < 1e-15 {
        return None;
    }
    Some(mean_f64(&pnl) / std * (pnl.len() as f64).sqrt())
}

/// Win rate: fraction of trades that were winners.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

pub fn gross_profit(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .filter(|t| t.net_pnl > 0.0)
        .map(|t| t.net_pnl)
        .sum()
}

pub fn gross_loss(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .filter(|t| t.net_pnl < 0.0)
        .map(|t| t.net_pnl)
        .sum()
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Simple returns between consecutive equity points.
pub fn bar_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stratlab_core::domain::{OpenTrade, TradeExit};

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn make_trade(side: PositionSide, open: f64, close: f64) -> Trade {
        OpenTrade {
            ref_id: 1,
            symbol: "SPY".into(),
            side,
            size: 10.0,
            open_bar: 0,
            open_timestamp: ts(2),
            open_price: open,
            entry_commission: 0.0,
        }
        .close(TradeExit {
            bar: 5,
            timestamp: ts(9),
            price: close,
            commission: 0.0,
            forced: false,
        })
    }

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn total_return_basic() {
        assert_approx(total_return(100.0, 110.0), 0.10);
        assert_approx(total_return(100.0, 90.0), -0.10);
        assert_eq!(total_return(0.0, 90.0), 0.0);
    }

    #[test]
    fn annualized_return_one_year_is_total() {
        let first = ts(1);
        let last = first + chrono::Duration::days(365);
        assert_approx(annualized_return(0.10, first, last).unwrap(), 0.10);
    }

    #[test]
    fn annualized_return_half_year_compounds() {
        let first = ts(1);
        let last = first + chrono::Duration::days(73);
        // five periods of 73 days per year
        assert_approx(
            annualized_return(0.02, first, last).unwrap(),
            1.02_f64.powi(5) - 1.0,
        );
    }

    #[test]
    fn annualized_return_undefined_cases() {
        assert_eq!(annualized_return(0.10, ts(1), ts(1)), None);
    }

    #[test]
    fn wiped_out_run_annualizes_to_total_loss() {
        assert_eq!(annualized_return(-1.0, ts(1), ts(20)), Some(-1.0));
        assert_eq!(annualized_return(-2.5, ts(1), ts(20)), Some(-1.0));
    }

    #[test]
    fn sharpe_needs_two_returns_and_variance() {
        assert_eq!(sharpe_ratio(&[100.0, 101.0]), None);
        assert_eq!(sharpe_ratio(&[100.0, 100.0, 100.0, 100.0]), None);
        let s = sharpe_ratio(&[100.0, 101.0, 100.5, 102.0, 103.0]).unwrap();
        assert!(s > 0.0);
    }

    #[test]
    fn sharpe_known_value() {
        // returns: +10%, -10%  → mean 0 → Sharpe 0
        let s = sharpe_ratio(&[100.0, 110.0, 99.0]).unwrap();
        assert_approx(s, 0.0);
    }

    #[test]
    fn max_drawdown_known() {
        // peak 120, trough 90 → 25%
        let dd = max_drawdown_pct(&[100.0, 120.0, 90.0, 110.0]);
        assert_approx(dd, 25.0);
    }

    #[test]
    fn max_drawdown_monotonic_increase() {
        assert_eq!(max_drawdown_pct(&[100.0, 101.0, 105.0]), 0.0);
    }

    #[test]
    fn max_drawdown_empty() {
        assert_eq!(max_drawdown_pct(&[]), 0.0);
    }

    #[test]
    fn win_rate_and_gross_totals() {
        let trades = vec![
            make_trade(PositionSide::Long, 100.0, 110.0),
            make_trade(PositionSide::Long, 100.0, 95.0),
            make_trade(PositionSide::Short, 100.0, 90.0),
        ];
        assert_approx(win_rate(&trades), 2.0 / 3.0);
        assert_approx(gross_profit(&trades), 200.0);
        assert_approx(gross_loss(&trades), -50.0);
        assert_eq!(win_rate(&[]), 0.0);
    }

    #[test]
    fn zero_pnl_trade_is_a_loss() {
        let trades = vec![make_trade(PositionSide::Long, 100.0, 100.0)];
        assert_eq!(win_rate(&trades), 0.0);
    }

    #[test]
    fn sqn_cases() {
        assert_eq!(sqn(&[make_trade(PositionSide::Long, 100.0, 110.0)]), None);
        let same = vec![
            make_trade(PositionSide::Long, 100.0, 110.0),
            make_trade(PositionSide::Long, 100.0, 110.0),
        ];
        assert_eq!(sqn(&same), None);
        let mixed = vec![
            make_trade(PositionSide::Long, 100.0, 110.0),
            make_trade(PositionSide::Long, 100.0, 130.0),
        ];
        // pnl 100, 300: mean 200, sample std 141.42 → 200/141.42*√2 = 2
        assert_approx(sqn(&mixed).unwrap(), 2.0);
    }

    #[test]
    fn std_dev_is_sample() {
        assert_approx(std_dev(&[1.0, 3.0]), 2.0_f64.sqrt());
        assert_eq!(std_dev(&[5.0]), 0.0);
    }
}
