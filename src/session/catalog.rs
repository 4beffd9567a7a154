//! Intent catalog offered in the training panel.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("El nombre del intent no puede estar vacío")]
    EmptyName,
}

/// Ordered intent names: loaded from the training API (or its fallback),
/// plus any created locally this session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntentCatalog {
    names: Vec<String>,
}

impl IntentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the catalog with a freshly loaded list.
    pub fn replace(&mut self, names: Vec<String>) {
        self.names = names;
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Add an operator-created intent. Local only; it reaches the training
    /// data once an example is accepted for it.
    ///
    /// Returns the normalised name.
    pub fn add_local(&mut self, raw: &str) -> Result<String, CatalogError> {
        let name = normalize_intent_name(raw);
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if !self.contains(&name) {
            self.names.push(name.clone());
        }
        Ok(name)
    }
}

/// Trim, lowercase, and join whitespace runs with `_`.
pub fn normalize_intent_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
