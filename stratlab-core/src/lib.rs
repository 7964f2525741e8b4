//! StratLab Core — price series, indicators, strategy policies, execution simulator.
//!
//! This crate contains the backtesting engine:
//! - Domain types (bars, price series, orders, fills, positions, trades)
//! - Data providers (synthetic, CSV, Yahoo Finance)
//! - Indicators precomputed once per run, with NaN warmup
//! - Strategy policies that map one bar plus indicators to an action
//! - A bar-by-bar simulator with next-open fills and a cash/position ledger

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;

pub use domain::{Bar, PriceSeries, Trade};
pub use engine::{run_simulation, EngineConfig, RunResult};
pub use strategy::{Strategy, StrategyPolicy, StrategySpec};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types handed to batch worker threads are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();
        require_send::<domain::Order>();
        require_sync::<domain::Order>();
        require_send::<domain::Fill>();
        require_sync::<domain::Fill>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();

        // Strategy types
        require_send::<strategy::StrategySpec>();
        require_sync::<strategy::StrategySpec>();
        require_send::<strategy::Strategy>();
        require_sync::<strategy::Strategy>();
        require_send::<indicators::IndicatorValues>();
        require_sync::<indicators::IndicatorValues>();

        // Engine types
        require_send::<engine::EngineConfig>();
        require_sync::<engine::EngineConfig>();
        require_send::<engine::RunResult>();
        require_sync::<engine::RunResult>();
        require_send::<engine::RunEvent>();
        require_sync::<engine::RunEvent>();

        // Providers
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();
        require_send::<data::CsvProvider>();
        require_sync::<data::CsvProvider>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
    }

    /// Architecture contract: a policy sees one bar and its own position,
    /// never the bar slice. Lookahead is impossible through this signature.
    #[test]
    fn policy_trait_has_no_future_bars() {
        fn _check_trait_object_builds(
            policy: &dyn strategy::StrategyPolicy,
            ctx: &strategy::PolicyContext<'_>,
            indicators: &indicators::IndicatorValues,
        ) -> strategy::Action {
            policy.decide(ctx, indicators)
        }
    }
}
