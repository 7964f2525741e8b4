//! Domain types for StratLab

pub mod bar;
pub mod fill;
pub mod order;
pub mod position;
pub mod series;
pub mod trade;

pub use bar::Bar;
pub use fill::Fill;
pub use order::{Order, OrderDirection, OrderId, OrderSide, OrderSize};
pub use position::{Position, PositionSide};
pub use series::PriceSeries;
pub use trade::{OpenTrade, Trade, TradeExit};
