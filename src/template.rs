// 🧩 Import Templates - Identity & Rules
// A template is a mapping script plus an ordered rule list used to classify import rows

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TEMPLATE TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    /// Shipped with the application, read-only
    Builtin,

    /// Authored by the user, persisted in the config document
    Custom,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Builtin => "builtin",
            TemplateType::Custom => "custom",
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RULE
// ============================================================================

/// A single condition/tags/skip triple evaluated against one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Boolean expression over row fields (language is external)
    pub condition: String,

    /// Labels attached to the row when the rule applies (ordered, may repeat)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Exclude the row from import when the rule applies
    #[serde(default)]
    pub skip: bool,
}

impl Rule {
    pub fn new(condition: impl Into<String>, tags: Vec<String>, skip: bool) -> Self {
        Rule {
            condition: condition.into(),
            tags,
            skip,
        }
    }

    /// Rule that only tags matching rows
    pub fn tagging<I, T>(condition: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Rule::new(condition, tags.into_iter().map(Into::into).collect(), false)
    }

    /// Rule that drops matching rows
    pub fn skipping(condition: impl Into<String>) -> Self {
        Rule::new(condition, Vec::new(), true)
    }
}

// ============================================================================
// TEMPLATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// `"<template_type>:<name>"`
    pub id: String,

    pub name: String,

    /// Transformation script, opaque here
    pub content: String,

    /// Always empty for builtins
    pub rules: Vec<Rule>,

    pub template_type: TemplateType,
}

impl Template {
    pub fn custom(name: impl Into<String>, content: impl Into<String>, rules: Vec<Rule>) -> Self {
        let name = name.into();
        Template {
            id: build_id(&name, TemplateType::Custom),
            name,
            content: content.into(),
            rules,
            template_type: TemplateType::Custom,
        }
    }

    pub fn builtin(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        Template {
            id: build_id(&name, TemplateType::Builtin),
            name,
            content: content.into(),
            rules: Vec::new(),
            template_type: TemplateType::Builtin,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.template_type == TemplateType::Builtin
    }

    pub fn is_custom(&self) -> bool {
        self.template_type == TemplateType::Custom
    }
}

/// Identity is a pure function of type and name.
pub fn build_id(name: &str, template_type: TemplateType) -> String {
    format!("{}:{}", template_type, name)
}

// ============================================================================
// TESTS
// ============================================================================
