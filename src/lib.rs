pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::ExchangeConfig;

pub use crate::core::{
    catalog::ProductCatalog, controller::SelectionController, settings::ControllerSettings,
};
pub use utils::error::{ExchangeError, Result};
