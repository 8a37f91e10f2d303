//! Content trees: the top-level document handed to the compiler.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::block::BlockNode;
use crate::error::{Error, Result};
use crate::render::css_class_for;

/// A content entry as produced by the authoring API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTree {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default)]
    pub data: ContentData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    #[serde(default)]
    pub blocks: Vec<BlockNode>,
    /// Serialized form of `blocks`; takes precedence when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks_string: Option<String>,
    /// Content-wide raw stylesheet text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_code: Option<String>,
}

impl ContentTree {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_block(mut self, block: BlockNode) -> Self {
        self.data.blocks.push(block);
        self
    }

    /// Parse a content tree from the authoring system's JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::malformed("content", e.to_string()))
    }

    /// Replace `blocks` with the parsed `blocksString`, if one is present.
    pub fn resolve_blocks(&mut self) -> Result<()> {
        if let Some(serialized) = self.data.blocks_string.take() {
            self.data.blocks = serde_json::from_str(&serialized)
                .map_err(|e| Error::malformed("data.blocksString", e.to_string()))?;
        }
        Ok(())
    }

    /// Check the fields rendering relies on: a content id, and a non-empty
    /// id on every block (column blocks included) that is unique within the
    /// tree and maps to a class no other block uses.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::malformed("content.id", "must not be empty"));
        }

        let mut ids = HashSet::new();
        let mut classes: HashMap<String, String> = HashMap::new();
        let mut stack: Vec<Cow<'_, BlockNode>> =
            self.data.blocks.iter().map(Cow::Borrowed).collect();
        while let Some(block) = stack.pop() {
            if block.id.trim().is_empty() {
                return Err(Error::malformed("block.id", "must not be empty"));
            }
            if !ids.insert(block.id.clone()) {
                return Err(Error::malformed(
                    format!("block {}", block.id),
                    "duplicate block id",
                ));
            }
            if let Some(other) = classes.insert(css_class_for(&block.id), block.id.clone()) {
                return Err(Error::malformed(
                    format!("block {}", block.id),
                    format!("generated class collides with block {other}"),
                ));
            }

            for column in block.column_blocks()? {
                stack.extend(column.into_iter().map(Cow::Owned));
            }
            match block {
                Cow::Borrowed(block) => stack.extend(block.children.iter().map(Cow::Borrowed)),
                Cow::Owned(block) => stack.extend(block.children.into_iter().map(Cow::Owned)),
            }
        }
        Ok(())
    }
}
