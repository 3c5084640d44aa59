// Adapters layer: concrete catalog sources, displays and prompts.

pub mod console;
pub mod effects;
pub mod json_catalog;
pub mod markup;
pub mod recording;

use crate::domain::model::CatalogEntry;
use crate::domain::ports::ProductCatalogSource;
use crate::utils::error::Result;

pub use console::{ConsolePrompt, ConsoleSink};
pub use effects::{Effect, EffectsDecorator};
pub use json_catalog::JsonCatalog;
pub use markup::MarkupCatalog;
pub use recording::{RecordingSink, ScriptedPrompt};

/// Fixed in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
    available_points: Option<u64>,
    confirm_control: Option<bool>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            available_points: None,
            confirm_control: None,
        }
    }

    pub fn with_available_points(mut self, points: u64) -> Self {
        self.available_points = Some(points);
        self
    }

    pub fn with_confirm_control(mut self, present: bool) -> Self {
        self.confirm_control = Some(present);
        self
    }
}

impl ProductCatalogSource for StaticCatalog {
    fn entries(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.entries.clone())
    }

    fn available_points(&self) -> Option<u64> {
        self.available_points
    }

    fn has_confirm_control(&self) -> Option<bool> {
        self.confirm_control
    }
}
