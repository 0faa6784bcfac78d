// 📦 Built-in Templates - shipped read-only with the binary
//
// Assets live in `templates/` and are compiled in with `include_str!`, so a
// missing or unreadable asset is a build failure rather than a runtime error.

use crate::template::Template;

/// Embedded assets, kept in directory-listing (filename ascending) order
const EMBEDDED: &[(&str, &str)] = &[
    (
        "HDFC.handlebars",
        include_str!("../templates/HDFC.handlebars"),
    ),
    (
        "ICICI Bank.handlebars",
        include_str!("../templates/ICICI Bank.handlebars"),
    ),
    ("SBI.handlebars", include_str!("../templates/SBI.handlebars")),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinAsset {
    pub file_name: String,
    pub content: String,
}

impl BuiltinAsset {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        BuiltinAsset {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Filename with its final extension stripped (`a.b.txt` -> `a.b`)
    pub fn template_name(&self) -> &str {
        strip_extension(&self.file_name)
    }
}

fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    }
}

/// Immutable set of shipped templates.
#[derive(Debug, Clone, Default)]
pub struct BuiltinBundle {
    assets: Vec<BuiltinAsset>,
}

impl BuiltinBundle {
    /// Assets compiled into this crate
    pub fn embedded() -> Self {
        BuiltinBundle::from_assets(
            EMBEDDED
                .iter()
                .map(|(file_name, content)| BuiltinAsset::new(*file_name, *content)),
        )
    }

    /// Bundle from caller-provided assets, sorted by filename like a directory listing
    pub fn from_assets<I>(assets: I) -> Self
    where
        I: IntoIterator<Item = BuiltinAsset>,
    {
        let mut assets: Vec<BuiltinAsset> = assets.into_iter().collect();
        assets.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        BuiltinBundle { assets }
    }

    pub fn empty() -> Self {
        BuiltinBundle::default()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn assets(&self) -> &[BuiltinAsset] {
        &self.assets
    }

    /// Materialize fresh templates, in bundle order.
    ///
    /// # Panics
    ///
    /// Panics if an asset's name is empty once its extension is stripped
    /// (e.g. `.txt`). That is a packaging defect, not a user error.
    pub fn templates(&self) -> Vec<Template> {
        self.assets
            .iter()
            .map(|asset| {
                let name = asset.template_name();
                assert!(
                    !name.is_empty(),
                    "corrupt builtin template bundle: asset {:?} has no name",
                    asset.file_name
                );
                Template::builtin(name, asset.content.clone())
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
