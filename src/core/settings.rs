use std::time::Duration;

pub const DEFAULT_BUDGET: u64 = 7000;
pub const DEFAULT_LOW_POINTS_THRESHOLD: u64 = 1000;
pub const DEFAULT_EXCHANGE_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_INSUFFICIENT_FLASH: Duration = Duration::from_millis(2000);

/// Text templates pushed to the display.
///
/// Placeholders: `confirm_active` takes `{count}` and `{points}`, `remaining` takes `{remaining}`,
/// `insufficient` takes `{shortfall}`, `success` takes `{count}`, `{points}` and `{remaining}`,
/// and `failure` takes `{reason}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub confirm_idle: String,
    pub confirm_active: String,
    pub processing: String,
    pub remaining: String,
    pub insufficient: String,
    pub success: String,
    pub failure: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            confirm_idle: "Select products to exchange".to_string(),
            confirm_active: "Exchange {count} items ({points} points)".to_string(),
            processing: "Processing...".to_string(),
            remaining: "{remaining}".to_string(),
            insufficient: "Not enough points ({shortfall} short)".to_string(),
            success: "Exchange complete! {count} items for {points} points, {remaining} points left."
                .to_string(),
            failure: "Exchange failed: {reason}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Budget used when the catalog source does not carry one.
    pub default_budget: u64,
    pub low_points_threshold: u64,
    pub exchange_delay: Duration,
    pub insufficient_flash: Duration,
    pub labels: Labels,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            default_budget: DEFAULT_BUDGET,
            low_points_threshold: DEFAULT_LOW_POINTS_THRESHOLD,
            exchange_delay: DEFAULT_EXCHANGE_DELAY,
            insufficient_flash: DEFAULT_INSUFFICIENT_FLASH,
            labels: Labels::default(),
        }
    }
}

impl ControllerSettings {
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.default_budget = budget;
        self
    }
}
