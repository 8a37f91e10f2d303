//! Block nodes: one renderable element of the content tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Responsive breakpoint a group of style declarations applies to.
///
/// Ordering follows cascade order: wider breakpoints come first so that
/// narrower ones override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Large,
    Medium,
    Small,
}

impl Breakpoint {
    /// Media query wrapping rules for this breakpoint (`None` for the default).
    pub fn media_query(self) -> Option<&'static str> {
        match self {
            Breakpoint::Large => None,
            Breakpoint::Medium => Some("(max-width: 991px)"),
            Breakpoint::Small => Some("(max-width: 640px)"),
        }
    }
}

/// A component reference with its configured options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Map::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Get a string option, ignoring non-string values.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Get a boolean option, treating absence as `false`.
    pub fn option_bool(&self, key: &str) -> bool {
        self.options.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Loop directive: render the block once per element of `collection` at
/// template execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repeat {
    pub collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
}

impl Repeat {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            item_name: None,
        }
    }

    /// Loop variable name. Defaults to the last path segment of the
    /// collection plus `_item` (`product.images` -> `images_item`).
    pub fn item_name(&self) -> String {
        if let Some(name) = self.item_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        let collection = self.collection.trim();
        let collection = collection.strip_prefix("state.").unwrap_or(collection);
        let last = collection
            .rsplit(['.', '['])
            .next()
            .unwrap_or(collection)
            .trim_end_matches(']')
            .trim_matches(|c| c == '\'' || c == '"');
        let stem: String = last
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if stem.is_empty() {
            "item".to_string()
        } else {
            format!("{stem}_item")
        }
    }
}

/// One node of the authored content tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<Component>,
    #[serde(default)]
    pub responsive_styles: BTreeMap<Breakpoint, BTreeMap<String, String>>,
    /// Target path (`component.options.text`, `style.color`, `show`, ...) to
    /// source expression.
    #[serde(default)]
    pub bindings: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<Repeat>,
    /// Static HTML attributes.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Raw stylesheet text attached to this block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_code: Option<String>,
    #[serde(default)]
    pub children: Vec<BlockNode>,
}

impl BlockNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.component = Some(component);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = Some(tag.into());
        self
    }

    pub fn with_style(
        mut self,
        breakpoint: Breakpoint,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.responsive_styles
            .entry(breakpoint)
            .or_default()
            .insert(property.into(), value.into());
        self
    }

    pub fn with_binding(mut self, path: impl Into<String>, expression: impl Into<String>) -> Self {
        self.bindings.insert(path.into(), expression.into());
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = Some(repeat);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css_code = Some(css.into());
        self
    }

    pub fn with_child(mut self, child: BlockNode) -> Self {
        self.children.push(child);
        self
    }

    /// Name of the component, if any.
    pub fn component_name(&self) -> Option<&str> {
        self.component.as_ref().map(|c| c.name.as_str())
    }

    /// Blocks of each column of a `Columns` component, read from
    /// `options.columns[].blocks`. Other blocks have no columns.
    pub fn column_blocks(&self) -> Result<Vec<Vec<BlockNode>>> {
        let Some(component) = self.component.as_ref().filter(|c| c.name == "Columns") else {
            return Ok(Vec::new());
        };
        let columns = match component.options.get("columns") {
            Some(Value::Array(columns)) => columns.as_slice(),
            Some(_) => {
                return Err(Error::malformed(
                    format!("block {}", self.id),
                    "`columns` must be an array",
                ));
            }
            None => &[],
        };

        columns
            .iter()
            .enumerate()
            .map(|(i, column)| match column.get("blocks") {
                Some(blocks) => serde_json::from_value(blocks.clone()).map_err(|e| {
                    Error::malformed(format!("block {} column {i}", self.id), e.to_string())
                }),
                None => Ok(Vec::new()),
            })
            .collect()
    }
}
