use crate::domain::model::CatalogEntry;
use crate::domain::ports::ProductCatalogSource;
use crate::utils::error::{ExchangeError, Result};
use serde_json::Value;
use std::path::Path;

/// Products from a JSON document.
///
/// Accepts either a bare array of `{ "id", "points", "name" }` objects or an object of the form
/// `{ "available_points": 7000, "products": [...] }`. Entries with a wrong shape are kept as
/// incomplete entries so the catalog can skip them.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    entries: Vec<CatalogEntry>,
    available_points: Option<u64>,
}

impl JsonCatalog {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(content)?;

        let (items, available_points) = match document {
            Value::Array(items) => (items, None),
            Value::Object(mut obj) => {
                let available = obj.get("available_points").and_then(Value::as_u64);
                match obj.remove("products") {
                    Some(Value::Array(items)) => (items, available),
                    _ => {
                        return Err(ExchangeError::CatalogError {
                            message: "expected a \"products\" array".to_string(),
                        })
                    }
                }
            }
            _ => {
                return Err(ExchangeError::CatalogError {
                    message: "catalog JSON must be an array or an object".to_string(),
                })
            }
        };

        let entries = items.iter().map(entry_from_value).collect();
        Ok(Self {
            entries,
            available_points,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }
}

fn entry_from_value(value: &Value) -> CatalogEntry {
    // 允許 id 為數字
    let id = match value.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    CatalogEntry {
        id,
        points: value.get("points").and_then(Value::as_u64),
        name: value.get("name").and_then(Value::as_str).map(str::to_string),
    }
}

impl ProductCatalogSource for JsonCatalog {
    fn entries(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.entries.clone())
    }

    fn available_points(&self) -> Option<u64> {
        self.available_points
    }
}
