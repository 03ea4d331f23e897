//! CSS object model: style sheets, grouping rules and style declarations

use crate::node::Source;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type RuleRef = Arc<CssRule>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CssRule {
    StyleSheet(StyleSheet),
    MediaRule(MediaRule),
    StyleRule(StyleRule),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    pub id: String,
    #[serde(default)]
    pub rules: Vec<RuleRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRule {
    pub id: String,
    pub condition_text: String,
    #[serde(default)]
    pub rules: Vec<RuleRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    pub id: String,
    pub selector_text: String,
    pub style: Arc<StyleDeclaration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

/// Open, order-preserving mapping of property name to value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDeclaration {
    pub id: String,
    #[serde(default)]
    pub properties: IndexMap<String, String>,
}

impl StyleSheet {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rules: Vec::new(),
            source: None,
        }
    }

    pub fn with_rule(mut self, rule: RuleRef) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn into_ref(self) -> RuleRef {
        Arc::new(CssRule::StyleSheet(self))
    }
}

impl MediaRule {
    pub fn new(id: impl Into<String>, condition_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            condition_text: condition_text.into(),
            rules: Vec::new(),
            source: None,
        }
    }

    pub fn with_rule(mut self, rule: RuleRef) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn into_ref(self) -> RuleRef {
        Arc::new(CssRule::MediaRule(self))
    }
}

impl StyleRule {
    pub fn new(
        id: impl Into<String>,
        selector_text: impl Into<String>,
        style: StyleDeclaration,
    ) -> Self {
        Self {
            id: id.into(),
            selector_text: selector_text.into(),
            style: Arc::new(style),
            source: None,
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn into_ref(self) -> RuleRef {
        Arc::new(CssRule::StyleRule(self))
    }
}

impl StyleDeclaration {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

impl CssRule {
    pub fn id(&self) -> &str {
        match self {
            CssRule::StyleSheet(sheet) => &sheet.id,
            CssRule::MediaRule(media) => &media.id,
            CssRule::StyleRule(rule) => &rule.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CssRule::StyleSheet(_) => "style sheet",
            CssRule::MediaRule(_) => "media rule",
            CssRule::StyleRule(_) => "style rule",
        }
    }

    pub fn source(&self) -> Option<&Source> {
        match self {
            CssRule::StyleSheet(sheet) => sheet.source.as_ref(),
            CssRule::MediaRule(media) => media.source.as_ref(),
            CssRule::StyleRule(rule) => rule.source.as_ref(),
        }
    }

    /// Child rules of a grouping rule, `None` for style rules
    pub fn rules(&self) -> Option<&[RuleRef]> {
        match self {
            CssRule::StyleSheet(sheet) => Some(&sheet.rules),
            CssRule::MediaRule(media) => Some(&media.rules),
            CssRule::StyleRule(_) => None,
        }
    }

    pub fn as_style_rule(&self) -> Option<&StyleRule> {
        match self {
            CssRule::StyleRule(rule) => Some(rule),
            _ => None,
        }
    }
}

impl From<StyleSheet> for CssRule {
    fn from(sheet: StyleSheet) -> Self {
        CssRule::StyleSheet(sheet)
    }
}

impl From<MediaRule> for CssRule {
    fn from(media: MediaRule) -> Self {
        CssRule::MediaRule(media)
    }
}

impl From<StyleRule> for CssRule {
    fn from(rule: StyleRule) -> Self {
        CssRule::StyleRule(rule)
    }
}
