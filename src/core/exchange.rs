use crate::domain::model::{ExchangeReceipt, ExchangeSummary};
use crate::domain::ports::ExchangeGateway;
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    /// Waiting for the simulated latency to elapse. The summary is what the user confirmed.
    Processing { ticket: u64, summary: ExchangeSummary },
    Completed { ticket: u64 },
}

impl ExchangeState {
    pub fn is_processing(&self) -> bool {
        matches!(self, ExchangeState::Processing { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExchangeState::Idle => "idle",
            ExchangeState::Processing { .. } => "processing",
            ExchangeState::Completed { .. } => "completed",
        }
    }
}

/// Local stand-in for a backend: every exchange succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedGateway;

impl ExchangeGateway for SimulatedGateway {
    fn settle(&mut self, receipt: &ExchangeReceipt) -> Result<()> {
        tracing::debug!(
            "Simulated settlement of ticket #{} for {} points",
            receipt.ticket,
            receipt.total_points
        );
        Ok(())
    }
}
