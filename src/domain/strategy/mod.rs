//! Strategy contract and the bundled policies.
//!
//! A strategy is fed every candle of a session through [`Strategy::push`] and
//! is then asked for at most one new order intent with
//! [`Strategy::poll_order`].

pub mod crossover;
pub mod quarter_edge;

use std::fmt;
use std::str::FromStr;

use crate::domain::candle::Candle;
use crate::domain::error::QuarterEdgeError;
use crate::domain::order::Order;

pub use crossover::{AverageKind, CrossoverParams, MovingAverageCrossover};
pub use quarter_edge::{QuarterEdgeParams, QuarterEdgeStrategy};

pub trait Strategy {
    fn name(&self) -> &str;

    /// Feeds one candle into the strategy's indicators and policy state.
    fn push(&mut self, candle: &Candle) -> Result<(), QuarterEdgeError>;

    /// A newly decided order, if the latest candle produced one.
    fn poll_order(&mut self) -> Option<Order>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    MaCrossover,
    EmaCrossover,
    QuarterEdge,
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ma_crossover" | "sma_crossover" => Ok(StrategyKind::MaCrossover),
            "ema_crossover" => Ok(StrategyKind::EmaCrossover),
            "quarter_edge" => Ok(StrategyKind::QuarterEdge),
            other => Err(format!("unknown strategy kind '{other}'")),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::MaCrossover => write!(f, "ma_crossover"),
            StrategyKind::EmaCrossover => write!(f, "ema_crossover"),
            StrategyKind::QuarterEdge => write!(f, "quarter_edge"),
        }
    }
}

/// Everything needed to build any bundled strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategySettings {
    pub kind: StrategyKind,
    pub crossover: CrossoverParams,
    pub quarter_edge: QuarterEdgeParams,
}

impl Default for StrategySettings {
    fn default() -> Self {
        StrategySettings {
            kind: StrategyKind::MaCrossover,
            crossover: CrossoverParams::default(),
            quarter_edge: QuarterEdgeParams::default(),
        }
    }
}

pub fn build_strategy(settings: &StrategySettings) -> Box<dyn Strategy> {
    match settings.kind {
        StrategyKind::MaCrossover => Box::new(MovingAverageCrossover::new(CrossoverParams {
            average: AverageKind::Simple,
            ..settings.crossover.clone()
        })),
        StrategyKind::EmaCrossover => Box::new(MovingAverageCrossover::new(CrossoverParams {
            average: AverageKind::Exponential,
            ..settings.crossover.clone()
        })),
        StrategyKind::QuarterEdge => {
            Box::new(QuarterEdgeStrategy::new(settings.quarter_edge.clone()))
        }
    }
}
