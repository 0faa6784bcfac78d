// 📚 Template Catalog - built-in + custom templates as one collection
//
// Built-ins come from the embedded bundle and are rebuilt on every read.
// Customs come from the config document and are the only editable templates.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::builtin::BuiltinBundle;
use crate::config::{ConfigDocument, ConfigStore, ImportTemplate, StoreError};
use crate::template::{Rule, Template};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("config store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

// ============================================================================
// CUSTOM TEMPLATES
// ============================================================================

/// Custom templates keyed by name, in display order.
///
/// A name maps to at most one entry. Upserting a name moves it to the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomTemplates {
    entries: IndexMap<String, ImportTemplate>,
}

impl CustomTemplates {
    /// Stored order is kept; a repeated name keeps its first position
    /// and takes the later entry's value
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ImportTemplate>,
    {
        let mut customs = CustomTemplates::default();
        for entry in entries {
            customs.entries.insert(entry.name.clone(), entry);
        }
        customs
    }

    /// Remove any entry with this name, then append
    pub fn upsert(&mut self, entry: ImportTemplate) {
        self.entries.shift_remove(&entry.name);
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn remove(&mut self, name: &str) -> Option<ImportTemplate> {
        self.entries.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&ImportTemplate> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn templates(&self) -> Vec<Template> {
        self.entries.values().map(to_template).collect()
    }

    pub fn into_entries(self) -> Vec<ImportTemplate> {
        self.entries.into_values().collect()
    }
}

fn to_template(entry: &ImportTemplate) -> Template {
    Template::custom(
        entry.name.clone(),
        entry.content.clone(),
        entry.rules.iter().cloned().map(Rule::from).collect(),
    )
}

// ============================================================================
// CATALOG
// ============================================================================

pub struct Catalog<S> {
    store: S,
    builtins: BuiltinBundle,
}

impl<S: ConfigStore> Catalog<S> {
    pub fn new(store: S, builtins: BuiltinBundle) -> Self {
        Catalog { store, builtins }
    }

    /// Catalog over the templates compiled into this crate
    pub fn with_embedded(store: S) -> Self {
        Catalog::new(store, BuiltinBundle::embedded())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn builtins(&self) -> &BuiltinBundle {
        &self.builtins
    }

    /// Custom templates first (stored order), then built-ins (bundle order)
    pub fn list(&self) -> Result<Vec<Template>> {
        let mut templates = self.customs()?;
        templates.extend(self.builtins.templates());
        Ok(templates)
    }

    pub fn customs(&self) -> Result<Vec<Template>> {
        let document = self.store.load()?;
        Ok(CustomTemplates::from_entries(document.import_templates).templates())
    }

    pub fn get(&self, id: &str) -> Result<Option<Template>> {
        Ok(self.list()?.into_iter().find(|t| t.id == id))
    }

    /// Create or replace the custom template `name`.
    ///
    /// The template is returned even in read-only mode, where nothing is written.
    pub fn upsert(&self, name: &str, content: &str, rules: Vec<Rule>) -> Result<Template> {
        let template = Template::custom(name, content, rules);

        let mut document = self.store.load()?;
        if document.readonly {
            debug!(id = %template.id, "read-only config, upsert not persisted");
            return Ok(template);
        }

        let stored = std::mem::take(&mut document.import_templates);
        let mut customs = CustomTemplates::from_entries(stored);
        customs.upsert(ImportTemplate::new(name, content, &template.rules));
        self.persist(document, customs)?;

        info!(id = %template.id, rules = template.rules.len(), "saved import template");
        Ok(template)
    }

    /// Remove the custom template `name`; unknown names are a no-op.
    pub fn delete(&self, name: &str) -> Result<()> {
        let mut document = self.store.load()?;
        if document.readonly {
            warn!(name, "read-only config, delete ignored");
            return Ok(());
        }

        let stored = std::mem::take(&mut document.import_templates);
        let mut customs = CustomTemplates::from_entries(stored);
        if customs.remove(name).is_none() {
            debug!(name, "no custom template to delete");
        }
        self.persist(document, customs)?;

        info!(name, "deleted import template");
        Ok(())
    }

    fn persist(&self, mut document: ConfigDocument, customs: CustomTemplates) -> Result<()> {
        document.import_templates = customs.into_entries();
        self.store.save(&document)?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BuiltinAsset;
    use crate::config::InMemoryStore;
    use crate::db::SqliteConfigStore;
    use crate::template::TemplateType;

    fn bank_bundle() -> BuiltinBundle {
        BuiltinBundle::from_assets(vec![
            BuiltinAsset::new("Default.txt", "{{ROW.A}}"),
            BuiltinAsset::new("Bank A.txt", "{{ROW.B}}"),
        ])
    }

    fn large_amount_rule() -> Rule {
        Rule::new("ROW.Amount>100", vec!["large".to_string()], false)
    }

    fn ids(templates: &[Template]) -> Vec<&str> {
        templates.iter().map(|t| t.id.as_str()).collect()
    }

    /// Store whose saves always fail
    struct BrokenStore;

    impl ConfigStore for BrokenStore {
        fn load(&self) -> std::result::Result<ConfigDocument, StoreError> {
            Ok(ConfigDocument::default())
        }

        fn save(&self, _document: &ConfigDocument) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".to_string()))
        }
    }

    #[test]
    fn test_list_customs_then_builtins() {
        let store = InMemoryStore::new(
            ConfigDocument::new()
                .with_template(ImportTemplate::new("Zeta", "z", &[]))
                .with_template(ImportTemplate::new("Alpha", "a", &[large_amount_rule()])),
        );
        let catalog = Catalog::new(&store, bank_bundle());

        let templates = catalog.list().unwrap();
        assert_eq!(
            ids(&templates),
            vec!["custom:Zeta", "custom:Alpha", "builtin:Bank A", "builtin:Default"]
        );
        assert_eq!(templates[1].rules, vec![large_amount_rule()]);
        assert!(templates[2].rules.is_empty());
    }

    #[test]
    fn test_duplicate_stored_names_later_wins() {
        let store = InMemoryStore::new(
            ConfigDocument::new()
                .with_template(ImportTemplate::new("A", "first", &[]))
                .with_template(ImportTemplate::new("B", "b", &[]))
                .with_template(ImportTemplate::new("A", "second", &[])),
        );
        let catalog = Catalog::new(&store, BuiltinBundle::empty());

        let customs = catalog.customs().unwrap();
        assert_eq!(ids(&customs), vec!["custom:A", "custom:B"]);
        assert_eq!(customs[0].content, "second");

        // an upsert of another name leaves the stored order in place
        catalog.upsert("C", "c", vec![]).unwrap();
        let names: Vec<String> = store
            .snapshot()
            .import_templates
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_upsert_builds_custom_identity() {
        let store = InMemoryStore::default();
        let catalog = Catalog::new(&store, BuiltinBundle::empty());

        for name in ["Default", "Bank A", "", "custom:odd"] {
            let template = catalog.upsert(name, "c", vec![]).unwrap();
            assert_eq!(template.id, format!("custom:{}", name));
            assert_eq!(template.template_type, TemplateType::Custom);
            assert_eq!(template.name, name);
        }
    }

    #[test]
    fn test_upsert_twice_is_idempotent() {
        let store = InMemoryStore::default();
        let catalog = Catalog::new(&store, BuiltinBundle::empty());

        catalog.upsert("n", "c", vec![large_amount_rule()]).unwrap();
        catalog.upsert("n", "c", vec![large_amount_rule()]).unwrap();

        let customs = catalog.customs().unwrap();
        assert_eq!(customs.len(), 1);
        assert_eq!(customs[0].content, "c");
        assert_eq!(customs[0].rules, vec![large_amount_rule()]);
        assert_eq!(store.snapshot().import_templates.len(), 1);
    }

    #[test]
    fn test_update_moves_template_to_end() {
        let store = InMemoryStore::default();
        let catalog = Catalog::new(&store, BuiltinBundle::empty());

        catalog.upsert("A", "a1", vec![]).unwrap();
        catalog.upsert("B", "b", vec![]).unwrap();
        catalog.upsert("A", "a2", vec![]).unwrap();

        let customs = catalog.customs().unwrap();
        assert_eq!(ids(&customs), vec!["custom:B", "custom:A"]);
        assert_eq!(customs[1].content, "a2");
    }

    #[test]
    fn test_upsert_keeps_rest_of_document() {
        let mut doc = ConfigDocument::new();
        doc.extra
            .insert("journal_path".to_string(), serde_json::json!("main.ledger"));
        let store = InMemoryStore::new(doc);
        let catalog = Catalog::new(&store, BuiltinBundle::empty());

        catalog.upsert("A", "a", vec![]).unwrap();

        assert_eq!(store.snapshot().extra["journal_path"], "main.ledger");
    }

    #[test]
    fn test_readonly_upsert_returns_value_without_writing() {
        let stored = ImportTemplate::new("Existing", "old", &[]);
        let store = InMemoryStore::new(
            ConfigDocument::new()
                .with_readonly(true)
                .with_template(stored.clone()),
        );
        let catalog = Catalog::new(&store, BuiltinBundle::empty());

        let before = store.snapshot().import_templates;
        let preview = catalog
            .upsert("Existing", "new", vec![large_amount_rule()])
            .unwrap();
        let after = store.snapshot().import_templates;

        assert_eq!(before, after);
        assert_eq!(after, vec![stored]);

        let writable = InMemoryStore::default();
        let expected = Catalog::new(&writable, BuiltinBundle::empty())
            .upsert("Existing", "new", vec![large_amount_rule()])
            .unwrap();
        assert_eq!(preview, expected);
    }

    #[test]
    fn test_readonly_delete_is_ignored() {
        let store = InMemoryStore::new(
            ConfigDocument::new()
                .with_readonly(true)
                .with_template(ImportTemplate::new("Keep", "k", &[])),
        );
        let catalog = Catalog::new(&store, BuiltinBundle::empty());

        catalog.delete("Keep").unwrap();

        assert_eq!(store.snapshot().import_templates.len(), 1);
    }

    #[test]
    fn test_delete_missing_name_is_noop() {
        let store = InMemoryStore::new(
            ConfigDocument::new().with_template(ImportTemplate::new("A", "a", &[])),
        );
        let catalog = Catalog::new(&store, bank_bundle());

        let before = catalog.list().unwrap();
        catalog.delete("Nope").unwrap();
        let after = catalog.list().unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn test_delete_removes_all_stored_duplicates() {
        let store = InMemoryStore::new(
            ConfigDocument::new()
                .with_template(ImportTemplate::new("A", "1", &[]))
                .with_template(ImportTemplate::new("A", "2", &[]))
                .with_template(ImportTemplate::new("B", "b", &[])),
        );
        let catalog = Catalog::new(&store, BuiltinBundle::empty());

        catalog.delete("A").unwrap();

        let names: Vec<String> = store
            .snapshot()
            .import_templates
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["B".to_string()]);
    }

    #[test]
    fn test_builtin_and_custom_share_a_name() {
        let store = InMemoryStore::default();
        let catalog = Catalog::new(&store, bank_bundle());

        catalog
            .upsert("Default", "x=y", vec![large_amount_rule()])
            .unwrap();

        let templates = catalog.list().unwrap();
        assert_eq!(
            ids(&templates),
            vec!["custom:Default", "builtin:Bank A", "builtin:Default"]
        );

        let custom = catalog.get("custom:Default").unwrap().unwrap();
        let builtin = catalog.get("builtin:Default").unwrap().unwrap();
        assert_eq!(custom.name, "Default");
        assert_eq!(builtin.name, "Default");
        assert_eq!(custom.template_type, TemplateType::Custom);
        assert_eq!(builtin.template_type, TemplateType::Builtin);
        assert_eq!(custom.rules, vec![large_amount_rule()]);
        assert!(builtin.rules.is_empty());

        catalog.delete("Default").unwrap();

        let templates = catalog.list().unwrap();
        assert_eq!(ids(&templates), vec!["builtin:Bank A", "builtin:Default"]);
        assert!(catalog.get("custom:Default").unwrap().is_none());
    }

    #[test]
    fn test_save_failure_surfaces_as_error() {
        let catalog = Catalog::new(BrokenStore, BuiltinBundle::empty());

        match catalog.upsert("A", "a", vec![]) {
            Err(CatalogError::Store(StoreError::Unavailable(msg))) => assert_eq!(msg, "disk full"),
            other => panic!("expected store error, got {:?}", other),
        }
        assert!(matches!(catalog.delete("A"), Err(CatalogError::Store(_))));
    }

    #[test]
    fn test_catalog_over_sqlite_store() {
        let store = SqliteConfigStore::open_in_memory().unwrap();
        let catalog = Catalog::with_embedded(store);

        catalog
            .upsert("SBI", "{{ROW.A}}", vec![Rule::skipping("ROW.A == ''")])
            .unwrap();

        let templates = catalog.list().unwrap();
        assert_eq!(templates[0].id, "custom:SBI");
        assert!(templates.iter().any(|t| t.id == "builtin:SBI"));
        assert_eq!(
            templates.len(),
            1 + catalog.builtins().len(),
            "builtins are never persisted"
        );
        assert_eq!(catalog.store().load().unwrap().import_templates.len(), 1);
    }
}
