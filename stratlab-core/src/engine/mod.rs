//! Execution engine: the bar loop, the ledger, and the run's event log.
//!
//! The simulator precomputes the strategy's indicators once, then walks
//! the bars in order:
//!
//! 1. Start-of-bar: fill the pending order at the open
//! 2. Decision: evaluate the policy, queue at most one order
//! 3. Terminal: liquidate an open position at the last close
//! 4. Post-bar: mark-to-market

pub mod events;
pub mod ledger;
pub mod simulator;
pub mod state;

pub use events::{EventKind, RunEvent};
pub use ledger::{FillStamp, Ledger, CASH_TOLERANCE};
pub use simulator::run_simulation;
pub use state::{EngineConfig, EquityPoint, ExecutionState, RejectReason, Rejection, RunResult};
