pub mod catalog;
pub mod controller;
pub mod exchange;
pub mod format;
pub mod scheduler;
pub mod settings;

pub use crate::domain::model::{CatalogEntry, Product, ToggleOutcome};
pub use crate::domain::ports::{DisplaySink, ProductCatalogSource, Scheduler};
pub use crate::utils::error::Result;
