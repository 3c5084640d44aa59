use crate::core::format::format_points;
use crate::domain::model::{ConfirmControl, ExchangeSummary, Notice};
use crate::domain::ports::{ConfirmPrompt, DisplaySink};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Renders display writes as lines on stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl DisplaySink for ConsoleSink {
    fn mark_selected(&mut self, id: &str, selected: bool) {
        let marker = if selected { "x" } else { " " };
        println!("  [{}] {}", marker, id);
    }

    fn set_confirm_state(&mut self, control: &ConfirmControl) {
        let state = if control.processing {
            "processing"
        } else if control.enabled {
            "enabled"
        } else {
            "disabled"
        };
        println!("  <{}> ({})", control.label, state);
    }

    fn set_remaining_display(&mut self, text: &str, low: bool) {
        if low {
            println!("  Points remaining: {} (low)", text);
        } else {
            println!("  Points remaining: {}", text);
        }
    }

    fn flash_insufficient(&mut self, id: &str, message: &str) {
        println!("  ⚠️  {}: {}", id, message);
    }

    fn clear_insufficient(&mut self, id: &str) {
        tracing::debug!("Insufficient-points warning on '{}' cleared", id);
    }

    fn flash_success(&mut self, id: &str) {
        tracing::debug!("Selected pulse on '{}'", id);
    }

    fn show_notice(&mut self, notice: &Notice) {
        match notice {
            Notice::ExchangeSucceeded { message } => println!("✅ {}", message),
            Notice::ExchangeFailed { message } => println!("❌ {}", message),
        }
    }
}

pub fn format_summary(summary: &ExchangeSummary) -> String {
    let mut out = String::from("Exchange the following items?\n");
    for line in &summary.lines {
        out.push_str(&format!(
            "  - {} ({} points)\n",
            line.name,
            format_points(line.points)
        ));
    }
    out.push_str(&format!(
        "Total: {} points\nRemaining after exchange: {} points",
        format_points(summary.total_points),
        format_points(summary.remaining_after)
    ));
    out
}

/// Yes/no prompt fed by the line channel of the interactive session.
pub struct ConsolePrompt<'a> {
    lines: &'a mut mpsc::Receiver<String>,
}

impl<'a> ConsolePrompt<'a> {
    pub fn new(lines: &'a mut mpsc::Receiver<String>) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl ConfirmPrompt for ConsolePrompt<'_> {
    async fn confirm(&mut self, summary: &ExchangeSummary) -> bool {
        println!("{}", format_summary(summary));
        println!("Confirm? [y/N]");
        match self.lines.recv().await {
            Some(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            None => false,
        }
    }
}
