//! Behavioral scenarios for each strategy over hand-built price paths.

use chrono::NaiveDate;
use stratlab_core::domain::{Bar, PositionSide, PriceSeries};
use stratlab_core::engine::{run_simulation, EngineConfig, EventKind, RunResult};
use stratlab_core::indicators::crossover::crossover_of;
use stratlab_core::strategy::StrategySpec;

/// Daily bars whose open is the previous close.
fn series_from_closes(closes: &[f64]) -> PriceSeries {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect();
    PriceSeries::new("TEST", bars).unwrap()
}

fn run(spec: StrategySpec, closes: &[f64]) -> RunResult {
    let strategy = spec.build().unwrap();
    run_simulation(
        &series_from_closes(closes),
        &strategy,
        &EngineConfig::new(10_000.0, 0.001),
    )
}

fn entries(result: &RunResult) -> usize {
    result
        .events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::TradeOpened { .. }))
        .count()
}

// ── Moving-average crossovers ────────────────────────────────────────

#[test]
fn flat_prices_never_cross() {
    let closes = vec![100.0; 50];
    for spec in [
        StrategySpec::SmaGoldenCross { fast: 10, slow: 20 },
        StrategySpec::ema_golden_cross_default(),
        StrategySpec::sma_golden_cross_default(),
    ] {
        let result = run(spec, &closes);
        assert!(result.trades.is_empty(), "{}", result.strategy);
        assert_eq!(result.final_equity, 10_000.0);
    }
}

#[test]
fn identical_series_produce_zero_crossover() {
    let a: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    assert!(crossover_of(&a, &a).iter().all(|&v| v == 0.0));
}

#[test]
fn v_shaped_recovery_triggers_golden_cross() {
    // 30 bars down, then 40 bars up: fast SMA crosses above slow on the way up
    let closes: Vec<f64> = (0..30)
        .map(|i| 130.0 - i as f64)
        .chain((0..40).map(|i| 101.0 + 2.0 * i as f64))
        .collect();
    let result = run(StrategySpec::SmaGoldenCross { fast: 5, slow: 20 }, &closes);
    assert_eq!(entries(&result), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.side, PositionSide::Long);
    assert!(trade.open_bar > 30);
    assert!(trade.forced_close);
}

// ── RSI ──────────────────────────────────────────────────────────────

#[test]
fn zig_zag_decline_keeps_rsi_between_thresholds() {
    // -1.6 / +0.9 alternating: RSI settles around 33-38
    let mut closes = vec![100.0];
    for i in 1..51 {
        let step = if i % 2 == 1 { -1.6 } else { 0.9 };
        closes.push(closes[i - 1] + step);
    }
    let result = run(StrategySpec::rsi_default(), &closes);
    assert_eq!(entries(&result), 0);
    assert!(result.trades.is_empty());
}

#[test]
fn monotonic_decline_is_oversold_and_enters_long() {
    let closes: Vec<f64> = (0..50).map(|i| 100.0 - 0.5 * i as f64).collect();
    let result = run(StrategySpec::rsi_default(), &closes);
    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.side, PositionSide::Long);
    // RSI(14) first defined (and 0) at bar 14; fill at the next open
    assert_eq!(trade.open_bar, 15);
    assert!(trade.forced_close);
}

#[test]
fn monotonic_rally_is_overbought_and_enters_short() {
    let closes: Vec<f64> = (0..50).map(|i| 100.0 + 0.5 * i as f64).collect();
    let result = run(StrategySpec::rsi_default(), &closes);
    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].side, PositionSide::Short);
    assert!(result.trades[0].net_pnl < 0.0);
}

/// 100 → 158 in steps of 2, then 160 → 450 in steps of 10.
fn squeeze_closes() -> Vec<f64> {
    (0..30)
        .map(|i| 100.0 + 2.0 * i as f64)
        .chain((0..30).map(|i| 160.0 + 10.0 * i as f64))
        .collect()
}

#[test]
fn short_squeeze_losses_are_not_capped_at_collateral() {
    let result = run(StrategySpec::rsi_default(), &squeeze_closes());
    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.side, PositionSide::Short);
    assert_eq!(trade.open_bar, 15);
    assert!(trade.forced_close);
    assert_eq!(trade.close_price, 450.0);
    // The loss exceeds the starting cash, so the buy-back overdraws.
    assert!(trade.net_pnl < -10_000.0);
    assert!(result.final_cash < 0.0);
    assert_eq!(result.final_equity, result.final_cash);
    assert!((result.final_cash - (10_000.0 + trade.net_pnl)).abs() < 1e-6);
    assert!(result.rejections.is_empty());
}

// ── MACD ─────────────────────────────────────────────────────────────

#[test]
fn steady_uptrend_enters_at_most_once() {
    let closes: Vec<f64> = (0..120).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
    let result = run(StrategySpec::macd_default(), &closes);
    assert!(entries(&result) <= 1);
}

#[test]
fn linear_uptrend_never_crosses_down() {
    let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
    let result = run(StrategySpec::macd_default(), &closes);
    assert!(entries(&result) <= 1);
    assert!(result
        .trades
        .iter()
        .all(|t| t.forced_close && t.side == PositionSide::Long));
}

// ── Buy & hold ───────────────────────────────────────────────────────

#[test]
fn buy_hold_single_trade_tracks_price_change() {
    let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
    let result = run(StrategySpec::BuyHold, &closes);
    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    // bar 1 opens at bar 0's close (100), last close is 119
    assert_eq!(trade.open_price, 100.0);
    assert_eq!(trade.close_price, 119.0);
    assert!(trade.gross_pnl > 0.0);
    assert!((trade.net_pnl - (trade.gross_pnl - trade.commission)).abs() < 1e-9);
}

#[test]
fn every_strategy_is_deterministic() {
    let closes: Vec<f64> = (0..150)
        .map(|i| 100.0 + 10.0 * (i as f64 * 0.15).sin() + 0.1 * i as f64)
        .collect();
    for spec in StrategySpec::catalog() {
        let a = run(spec.clone(), &closes);
        let b = run(spec, &closes);
        assert_eq!(a.trades, b.trades, "{}", a.strategy);
        assert_eq!(a.final_equity, b.final_equity);
    }
}
