//! Core domain types and logic.

pub mod error;
pub mod candle;
pub mod order;
pub mod window;
pub mod indicator;
pub mod levels;
pub mod strategy;
pub mod session;
pub mod backtest;
pub mod performance;
pub mod config_validation;
