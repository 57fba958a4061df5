//! Candle data port.

use crate::domain::backtest::TradingSession;
use crate::domain::error::QuarterEdgeError;

pub trait DataPort {
    /// Every complete session in the source, in source order.
    fn load_sessions(&self) -> Result<Vec<TradingSession>, QuarterEdgeError>;
}
