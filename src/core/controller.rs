use crate::core::catalog::ProductCatalog;
use crate::core::exchange::{ExchangeState, SimulatedGateway};
use crate::core::format::{format_points, render_template};
use crate::core::scheduler::TimerQueue;
use crate::core::settings::ControllerSettings;
use crate::domain::model::{
    ConfirmControl, ConfirmOutcome, ControllerSnapshot, ExchangeReceipt, ExchangeSummary, Notice,
    SummaryLine, ToggleOutcome,
};
use crate::domain::ports::{
    ConfirmPrompt, DeferredEvent, DisplaySink, ExchangeGateway, ProductCatalogSource, Scheduler,
};
use crate::utils::error::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;

/// Budget-constrained product selection with display synchronization.
///
/// The controller owns the catalog and the budget. Every mutation is pushed to the
/// [`DisplaySink`] immediately; the sink is never read back. Deferred work (the simulated
/// exchange latency and the auto-clearing "insufficient points" flash) goes through the
/// injected [`Scheduler`] and only runs from [`SelectionController::advance`].
pub struct SelectionController<D, S = TimerQueue, G = SimulatedGateway>
where
    D: DisplaySink,
    S: Scheduler,
    G: ExchangeGateway,
{
    catalog: ProductCatalog,
    available_points: u64,
    sink: D,
    scheduler: S,
    gateway: G,
    settings: ControllerSettings,
    exchange: ExchangeState,
    confirm_wired: bool,
    next_ticket: u64,
    flash_generations: HashMap<String, u64>,
    history: Vec<ExchangeReceipt>,
}

impl<D: DisplaySink> SelectionController<D> {
    /// Reads the catalog once and pushes the empty-selection state to the display.
    pub fn init<C>(source: &C, sink: D, settings: ControllerSettings) -> Result<Self>
    where
        C: ProductCatalogSource + ?Sized,
    {
        Self::with_parts(source, sink, TimerQueue::new(), SimulatedGateway, settings)
    }
}

impl<D, S, G> SelectionController<D, S, G>
where
    D: DisplaySink,
    S: Scheduler,
    G: ExchangeGateway,
{
    pub fn with_parts<C>(
        source: &C,
        sink: D,
        scheduler: S,
        gateway: G,
        settings: ControllerSettings,
    ) -> Result<Self>
    where
        C: ProductCatalogSource + ?Sized,
    {
        let catalog = ProductCatalog::from_entries(source.entries()?);
        let available_points = source
            .available_points()
            .unwrap_or(settings.default_budget);

        let confirm_wired =
            sink.has_confirm_control() && source.has_confirm_control().unwrap_or(true);
        if !confirm_wired {
            tracing::warn!("No confirmation control found; exchanges cannot be confirmed");
        }

        tracing::info!(
            "🛒 Loaded {} products, {} points available",
            catalog.len(),
            format_points(available_points)
        );

        let mut controller = Self {
            catalog,
            available_points,
            sink,
            scheduler,
            gateway,
            settings,
            exchange: ExchangeState::Idle,
            confirm_wired,
            next_ticket: 0,
            flash_generations: HashMap::new(),
            history: Vec::new(),
        };
        controller.refresh_display();
        Ok(controller)
    }

    /// Selects or deselects a product, enforcing the budget on selection.
    pub fn toggle_selection(&mut self, id: &str) -> ToggleOutcome {
        if self.exchange.is_processing() {
            tracing::debug!("Ignoring toggle of '{}' while an exchange is processing", id);
            return ToggleOutcome::Locked;
        }

        let Some(product) = self.catalog.get(id) else {
            tracing::debug!("Ignoring toggle of unknown product '{}'", id);
            return ToggleOutcome::UnknownProduct;
        };
        let (was_selected, cost) = (product.selected, product.points);

        let outcome = if was_selected {
            self.catalog.set_selected(id, false);
            self.sink.mark_selected(id, false);
            tracing::debug!("Deselected '{}' ({} points)", id, cost);
            ToggleOutcome::Deselected
        } else {
            let projected = self.total_selected_points().saturating_add(cost);
            if projected <= self.available_points {
                self.catalog.set_selected(id, true);
                self.sink.mark_selected(id, true);
                self.sink.flash_success(id);
                tracing::debug!("Selected '{}' ({} points)", id, cost);
                ToggleOutcome::Selected
            } else {
                let shortfall = projected - self.available_points;
                self.flash_insufficient(id, shortfall);
                tracing::debug!("Rejected '{}': {} points short", id, shortfall);
                ToggleOutcome::Rejected { shortfall }
            }
        };

        self.refresh_display();
        outcome
    }

    /// Asks the prompt to confirm the current selection and starts the exchange on "yes".
    pub async fn confirm_selection<P>(&mut self, prompt: &mut P) -> ConfirmOutcome
    where
        P: ConfirmPrompt + ?Sized,
    {
        if !self.confirm_wired {
            return ConfirmOutcome::NoConfirmControl;
        }
        if self.exchange.is_processing() {
            return ConfirmOutcome::Busy;
        }
        if !self.has_selection() {
            return ConfirmOutcome::EmptySelection;
        }

        let summary = self.exchange_summary();
        if !prompt.confirm(&summary).await {
            tracing::info!("Exchange of {} items declined", summary.item_count());
            return ConfirmOutcome::Declined;
        }

        match self.process_exchange() {
            Some(ticket) => ConfirmOutcome::Processing { ticket },
            None => ConfirmOutcome::Busy,
        }
    }

    /// Puts the confirmation control into its processing state and schedules completion.
    ///
    /// Returns `None` when an exchange is already pending or nothing is selected.
    pub fn process_exchange(&mut self) -> Option<u64> {
        if self.exchange.is_processing() || !self.has_selection() {
            return None;
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let summary = self.exchange_summary();

        tracing::info!(
            "⏳ Processing exchange #{}: {} items for {} points",
            ticket,
            summary.item_count(),
            format_points(summary.total_points)
        );

        self.exchange = ExchangeState::Processing { ticket, summary };
        self.update_confirm_control();
        self.scheduler.schedule(
            self.settings.exchange_delay,
            DeferredEvent::CompleteExchange { ticket },
        );
        Some(ticket)
    }

    /// Advances the scheduler clock and runs every deferred event that became due.
    /// Returns the number of events handled.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let due = self.scheduler.advance(elapsed);
        let count = due.len();
        for event in due {
            self.handle_deferred(event);
        }
        count
    }

    pub fn exchange_summary(&self) -> ExchangeSummary {
        let lines: Vec<SummaryLine> = self
            .catalog
            .selected()
            .map(|p| SummaryLine {
                id: p.id.clone(),
                name: p.display_name().to_string(),
                points: p.points,
            })
            .collect();
        let total_points = lines.iter().map(|l| l.points).sum();

        ExchangeSummary {
            lines,
            total_points,
            remaining_after: self.available_points.saturating_sub(total_points),
        }
    }

    pub fn total_selected_points(&self) -> u64 {
        self.catalog.total_selected_points()
    }

    pub fn remaining_points(&self) -> u64 {
        self.available_points - self.total_selected_points()
    }

    pub fn available_points(&self) -> u64 {
        self.available_points
    }

    pub fn has_selection(&self) -> bool {
        self.catalog.has_selection()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.catalog.get(id).is_some_and(|p| p.selected)
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.catalog.selected_ids()
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn exchange_state(&self) -> &ExchangeState {
        &self.exchange
    }

    /// Receipts of exchanges completed in this session, oldest first.
    pub fn history(&self) -> &[ExchangeReceipt] {
        &self.history
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            available_points: self.available_points,
            total_selected: self.total_selected_points(),
            remaining: self.remaining_points(),
            selected: self.selected_ids(),
            exchange: self.exchange.label().to_string(),
            completed_exchanges: self.history.len(),
        }
    }

    fn handle_deferred(&mut self, event: DeferredEvent) {
        match event {
            DeferredEvent::ClearInsufficient { id, generation } => {
                if self.flash_generations.get(&id) == Some(&generation) {
                    self.flash_generations.remove(&id);
                    self.sink.clear_insufficient(&id);
                }
            }
            DeferredEvent::CompleteExchange { ticket } => {
                match std::mem::replace(&mut self.exchange, ExchangeState::Idle) {
                    ExchangeState::Processing {
                        ticket: pending,
                        summary,
                    } if pending == ticket => self.complete_exchange(ticket, summary),
                    other => {
                        tracing::debug!("Ignoring stale completion for exchange #{}", ticket);
                        self.exchange = other;
                    }
                }
            }
        }
    }

    fn complete_exchange(&mut self, ticket: u64, summary: ExchangeSummary) {
        let receipt = ExchangeReceipt {
            ticket,
            lines: summary.lines,
            total_points: summary.total_points,
            remaining_after: summary.remaining_after,
            completed_at: Utc::now(),
        };

        match self.gateway.settle(&receipt) {
            Ok(()) => {
                let labels = &self.settings.labels;
                let message = render_template(
                    &labels.success,
                    &[
                        ("count", receipt.lines.len().to_string()),
                        ("points", format_points(receipt.total_points)),
                        ("remaining", format_points(receipt.remaining_after)),
                    ],
                );
                self.sink.show_notice(&Notice::ExchangeSucceeded { message });
                self.reset_after_exchange(receipt.total_points);
                self.exchange = ExchangeState::Completed { ticket };

                tracing::info!(
                    "✅ Exchange #{} completed, {} points remaining",
                    ticket,
                    format_points(self.available_points)
                );
                self.history.push(receipt);
            }
            Err(e) => {
                tracing::warn!("❌ Exchange #{} failed: {}", ticket, e);
                let message =
                    render_template(&self.settings.labels.failure, &[("reason", e.to_string())]);
                self.sink.show_notice(&Notice::ExchangeFailed { message });
                self.exchange = ExchangeState::Idle;
                self.refresh_display();
            }
        }
    }

    /// Consumes the spent points and returns every product to unselected.
    fn reset_after_exchange(&mut self, spent: u64) {
        self.available_points = self.available_points.saturating_sub(spent);
        for id in self.catalog.clear_selection() {
            self.sink.mark_selected(&id, false);
        }
        self.refresh_display();
    }

    fn flash_insufficient(&mut self, id: &str, shortfall: u64) {
        let generation = self.flash_generations.entry(id.to_string()).or_insert(0);
        *generation += 1;
        let generation = *generation;

        let message = render_template(
            &self.settings.labels.insufficient,
            &[("shortfall", format_points(shortfall))],
        );
        self.sink.flash_insufficient(id, &message);
        self.scheduler.schedule(
            self.settings.insufficient_flash,
            DeferredEvent::ClearInsufficient {
                id: id.to_string(),
                generation,
            },
        );
    }

    fn refresh_display(&mut self) {
        self.update_confirm_control();
        self.update_points_display();
    }

    fn update_confirm_control(&mut self) {
        if !self.confirm_wired {
            return;
        }

        let labels = &self.settings.labels;
        let control = if self.exchange.is_processing() {
            ConfirmControl {
                enabled: false,
                processing: true,
                label: labels.processing.clone(),
            }
        } else if self.has_selection() {
            ConfirmControl {
                enabled: true,
                processing: false,
                label: render_template(
                    &labels.confirm_active,
                    &[
                        ("count", self.catalog.selected_count().to_string()),
                        ("points", format_points(self.total_selected_points())),
                    ],
                ),
            }
        } else {
            ConfirmControl {
                enabled: false,
                processing: false,
                label: labels.confirm_idle.clone(),
            }
        };
        self.sink.set_confirm_state(&control);
    }

    fn update_points_display(&mut self) {
        let remaining = self.remaining_points();
        let text = render_template(
            &self.settings.labels.remaining,
            &[("remaining", format_points(remaining))],
        );
        let low = remaining < self.settings.low_points_threshold;
        self.sink.set_remaining_display(&text, low);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::recording::{RecordingSink, ScriptedPrompt, SinkCall};
    use crate::adapters::StaticCatalog;
    use crate::domain::model::CatalogEntry;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new(vec![
            CatalogEntry::new("a", 3000, Some("Coffee Mug")),
            CatalogEntry::new("b", 5000, None),
            CatalogEntry::new("c", 2000, Some("Tote Bag")),
        ])
        .with_available_points(7000)
    }

    fn controller() -> SelectionController<RecordingSink> {
        SelectionController::init(&catalog(), RecordingSink::new(), ControllerSettings::default())
            .unwrap()
    }

    #[test]
    fn test_init_pushes_baseline_state() {
        let ctrl = controller();
        let control = ctrl.sink().last_confirm().unwrap();
        assert!(!control.enabled);
        assert_eq!(control.label, "Select products to exchange");
        assert_eq!(ctrl.sink().last_remaining(), Some(("7,000".to_string(), false)));
    }

    #[test]
    fn test_rejection_does_not_mutate() {
        let mut ctrl = controller();
        assert_eq!(ctrl.toggle_selection("a"), ToggleOutcome::Selected);
        ctrl.sink_mut().clear();

        assert_eq!(
            ctrl.toggle_selection("b"),
            ToggleOutcome::Rejected { shortfall: 1000 }
        );
        assert_eq!(ctrl.selected_ids(), vec!["a"]);
        assert!(!ctrl.is_selected("b"));
        assert_eq!(ctrl.available_points(), 7000);
        assert!(ctrl.sink().calls().iter().all(|call| !matches!(
            call,
            SinkCall::MarkSelected { .. }
        )));
        assert!(ctrl.sink().is_flashing_insufficient("b"));
    }

    #[test]
    fn test_reflash_restarts_clear_timer() {
        let mut ctrl = controller();
        ctrl.toggle_selection("a");
        ctrl.toggle_selection("b");

        ctrl.advance(Duration::from_millis(1500));
        ctrl.toggle_selection("b");

        // First flash's timer is stale now
        ctrl.advance(Duration::from_millis(500));
        assert!(ctrl.sink().is_flashing_insufficient("b"));

        ctrl.advance(Duration::from_millis(1500));
        assert!(!ctrl.sink().is_flashing_insufficient("b"));
    }

    #[test]
    fn test_confirm_with_empty_selection_is_noop() {
        let mut ctrl = controller();
        let mut prompt = ScriptedPrompt::always(true);
        let outcome = tokio_test::block_on(ctrl.confirm_selection(&mut prompt));
        assert_eq!(outcome, ConfirmOutcome::EmptySelection);
        assert!(prompt.seen().is_empty());
    }

    #[test]
    fn test_page_without_confirm_control() {
        let source = catalog().with_confirm_control(false);
        let mut ctrl =
            SelectionController::init(&source, RecordingSink::new(), ControllerSettings::default())
                .unwrap();

        assert_eq!(ctrl.toggle_selection("a"), ToggleOutcome::Selected);
        assert!(ctrl.sink().last_confirm().is_none());
        assert_eq!(ctrl.sink().last_remaining(), Some(("4,000".to_string(), false)));

        let mut prompt = ScriptedPrompt::always(true);
        let outcome = tokio_test::block_on(ctrl.confirm_selection(&mut prompt));
        assert_eq!(outcome, ConfirmOutcome::NoConfirmControl);
    }

    #[test]
    fn test_unknown_product_is_noop() {
        let mut ctrl = controller();
        let before = ctrl.sink().calls().len();
        assert_eq!(ctrl.toggle_selection("nope"), ToggleOutcome::UnknownProduct);
        assert_eq!(ctrl.sink().calls().len(), before);
    }
}
