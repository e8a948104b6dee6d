//! Domain types shared across pipeline stages.
//!
//! Every type here is an immutable value produced by one stage and consumed
//! by the next; none of them hold shared mutable state. Date keys are
//! `chrono::NaiveDate` and containers are ordered, so iteration order is
//! deterministic everywhere.

pub mod factors;
pub mod panel;
pub mod prices;
pub mod series;
pub mod weights;

pub use factors::FactorTable;
pub use panel::SignalPanel;
pub use prices::PriceTable;
pub use series::DailySeries;
pub use weights::WeightMatrix;
