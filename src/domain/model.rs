use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry read from a catalog source, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: Option<String>,
    pub points: Option<u64>,
    pub name: Option<String>,
}

impl CatalogEntry {
    pub fn new(id: &str, points: u64, name: Option<&str>) -> Self {
        Self {
            id: Some(id.to_string()),
            points: Some(points),
            name: name.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: String,
    pub points: u64,
    pub name: Option<String>,
    pub selected: bool,
}

impl Product {
    /// Name used in summaries; falls back to the identifier.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// What the confirmation control should currently show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmControl {
    pub enabled: bool,
    pub processing: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryLine {
    pub id: String,
    pub name: String,
    pub points: u64,
}

/// Human-readable summary presented before an exchange is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeSummary {
    pub lines: Vec<SummaryLine>,
    pub total_points: u64,
    pub remaining_after: u64,
}

impl ExchangeSummary {
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeReceipt {
    pub ticket: u64,
    pub lines: Vec<SummaryLine>,
    pub total_points: u64,
    pub remaining_after: u64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    ExchangeSucceeded { message: String },
    ExchangeFailed { message: String },
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::ExchangeSucceeded { message } | Notice::ExchangeFailed { message } => message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    /// Selection would exceed the budget by `shortfall` points.
    Rejected { shortfall: u64 },
    /// A pending exchange holds the selection.
    Locked,
    UnknownProduct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Processing { ticket: u64 },
    Declined,
    EmptySelection,
    Busy,
    NoConfirmControl,
}

/// Serializable view of the controller, used by the `status` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    pub available_points: u64,
    pub total_selected: u64,
    pub remaining: u64,
    pub selected: Vec<String>,
    pub exchange: String,
    pub completed_exchanges: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_id() {
        let mut product = Product {
            id: "gift-card".to_string(),
            points: 3000,
            name: None,
            selected: false,
        };
        assert_eq!(product.display_name(), "gift-card");

        product.name = Some("Gift Card".to_string());
        assert_eq!(product.display_name(), "Gift Card");
    }

    #[test]
    fn test_notice_serializes_with_kind_tag() {
        let notice = Notice::ExchangeSucceeded {
            message: "done".to_string(),
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["kind"], "exchange_succeeded");
        assert_eq!(json["message"], "done");
    }
}
