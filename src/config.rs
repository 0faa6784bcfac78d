// ⚙️ Configuration Document - the persisted shape of custom templates
// The document is owned by the host; this crate only touches `readonly` and `import_templates`

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

use crate::template::Rule;

// ============================================================================
// DOCUMENT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// When set, template edits are previewed but never written
    #[serde(default)]
    pub readonly: bool,

    #[serde(default)]
    pub import_templates: Vec<ImportTemplate>,

    /// Every other key of the host's document, carried through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTemplate {
    pub name: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub rules: Vec<ImportRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRule {
    pub condition: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub skip: bool,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: toggle read-only mode
    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Builder: append a stored template entry
    pub fn with_template(mut self, template: ImportTemplate) -> Self {
        self.import_templates.push(template);
        self
    }
}

impl ImportTemplate {
    pub fn new(name: impl Into<String>, content: impl Into<String>, rules: &[Rule]) -> Self {
        ImportTemplate {
            name: name.into(),
            content: content.into(),
            rules: rules.iter().cloned().map(ImportRule::from).collect(),
        }
    }
}

impl From<Rule> for ImportRule {
    fn from(rule: Rule) -> Self {
        ImportRule {
            condition: rule.condition,
            tags: rule.tags,
            skip: rule.skip,
        }
    }
}

impl From<ImportRule> for Rule {
    fn from(rule: ImportRule) -> Self {
        Rule {
            condition: rule.condition,
            tags: rule.tags,
            skip: rule.skip,
        }
    }
}

// ============================================================================
// STORE
// ============================================================================

/// Errors raised while loading or saving the configuration document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend refused or could not complete the operation
    #[error("Config store unavailable: {0}")]
    Unavailable(String),
}

/// Load/save access to the whole configuration document.
///
/// Implementations are responsible for serializing concurrent
/// read-modify-write cycles; callers assume exclusive access per call.
pub trait ConfigStore {
    fn load(&self) -> Result<ConfigDocument, StoreError>;

    fn save(&self, document: &ConfigDocument) -> Result<(), StoreError>;
}

impl<S: ConfigStore + ?Sized> ConfigStore for &S {
    fn load(&self) -> Result<ConfigDocument, StoreError> {
        (**self).load()
    }

    fn save(&self, document: &ConfigDocument) -> Result<(), StoreError> {
        (**self).save(document)
    }
}

impl<S: ConfigStore + ?Sized> ConfigStore for Arc<S> {
    fn load(&self) -> Result<ConfigDocument, StoreError> {
        (**self).load()
    }

    fn save(&self, document: &ConfigDocument) -> Result<(), StoreError> {
        (**self).save(document)
    }
}

/// Document held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    document: Mutex<ConfigDocument>,
}

impl InMemoryStore {
    pub fn new(document: ConfigDocument) -> Self {
        InMemoryStore {
            document: Mutex::new(document),
        }
    }

    /// Copy of the currently stored document
    pub fn snapshot(&self) -> ConfigDocument {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConfigStore for InMemoryStore {
    fn load(&self) -> Result<ConfigDocument, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, document: &ConfigDocument) -> Result<(), StoreError> {
        let mut stored = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        *stored = document.clone();
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
