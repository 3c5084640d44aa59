use crate::domain::model::{
    CatalogEntry, ConfirmControl, ExchangeReceipt, ExchangeSummary, Notice,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Read-once source of products, consumed at controller start-up.
pub trait ProductCatalogSource {
    fn entries(&self) -> Result<Vec<CatalogEntry>>;

    /// Budget shown by the source, when it carries one.
    fn available_points(&self) -> Option<u64> {
        None
    }

    /// Whether the page carries a confirmation control; `None` when the source cannot tell.
    fn has_confirm_control(&self) -> Option<bool> {
        None
    }
}

/// Write-only rendering surface. The controller never reads state back from it.
pub trait DisplaySink {
    fn mark_selected(&mut self, id: &str, selected: bool);
    fn set_confirm_state(&mut self, control: &ConfirmControl);
    fn set_remaining_display(&mut self, text: &str, low: bool);
    fn flash_insufficient(&mut self, id: &str, message: &str);
    fn clear_insufficient(&mut self, id: &str);
    fn flash_success(&mut self, id: &str);
    fn show_notice(&mut self, notice: &Notice);

    fn has_confirm_control(&self) -> bool {
        true
    }
}

#[async_trait]
pub trait ConfirmPrompt: Send {
    async fn confirm(&mut self, summary: &ExchangeSummary) -> bool;
}

/// Settles a confirmed exchange. An `Err` leaves selection and budget untouched.
pub trait ExchangeGateway {
    fn settle(&mut self, receipt: &ExchangeReceipt) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredEvent {
    CompleteExchange { ticket: u64 },
    ClearInsufficient { id: String, generation: u64 },
}

/// Timer abstraction. Time only moves when `advance` is called.
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration, event: DeferredEvent);

    /// Moves the clock forward and returns the events that became due, in firing order.
    fn advance(&mut self, elapsed: Duration) -> Vec<DeferredEvent>;

    fn pending(&self) -> usize;
}
