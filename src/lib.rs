// Import Templates - Core Library
// Built-in + custom import templates and the rules that classify transaction rows

pub mod template;
pub mod config;
pub mod db;
pub mod builtin;
pub mod catalog;
pub mod rows;
pub mod evaluator;

// Re-export commonly used types
pub use template::{build_id, Rule, Template, TemplateType};
pub use config::{
    ConfigDocument, ConfigStore, ImportRule, ImportTemplate, InMemoryStore, StoreError,
};
pub use db::{setup_database, SqliteConfigStore};
pub use builtin::{BuiltinAsset, BuiltinBundle};
pub use catalog::{Catalog, CatalogError, CustomTemplates};
pub use rows::{column_name, read_csv_rows, Row};
pub use evaluator::{Classification, ConditionEvaluator, MatchPolicy, RuleEvaluator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
