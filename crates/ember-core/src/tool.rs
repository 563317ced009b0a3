//! Tool descriptors and the canonical tool registry

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Immutable descriptor of a capability an agent may call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Unique tool name
    pub name: String,
    /// Category tags used for tag-based recall
    #[serde(default)]
    pub tags: Vec<String>,
    /// Human-readable description surfaced to ranking prompts
    #[serde(default)]
    pub description: String,
    /// Structured call signature (JSON schema) surfaced to the agent prompt
    #[serde(default)]
    pub schema: serde_json::Value,
}

impl Tool {
    /// Create a tool with a name and description and no tags or schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            description: description.into(),
            schema: serde_json::Value::Null,
        }
    }

    /// Attach category tags
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a call-signature schema
    #[must_use]
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = schema;
        self
    }
}

/// Which registry tools a consumer wants to draw from
///
/// Replaces the original `"<all>"` magic string with an explicit variant;
/// `from_names` still accepts the sentinel for config compatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolSelection {
    /// Every registered tool
    All,
    /// A named subset, in the given order
    Named(Vec<String>),
}

/// Sentinel accepted in configuration for [`ToolSelection::All`]
pub const ALL_TOOLS_SENTINEL: &str = "<all>";

impl ToolSelection {
    /// Parse a config-level name list, honoring the `"<all>"` sentinel
    pub fn from_names(names: &[String]) -> Self {
        if names.len() == 1 && names[0] == ALL_TOOLS_SENTINEL {
            Self::All
        } else {
            Self::Named(names.to_vec())
        }
    }
}

/// Canonical, process-wide pool of tool definitions
///
/// Insertion order is pool order: every consumer that truncates or
/// tie-breaks "in pool order" means the order tools were registered in.
/// Consumers hold `Arc<Tool>` views into this registry, so a subset mapping
/// can never drift from the canonical definitions.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; a repeated name replaces the earlier definition
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), Arc::new(tool));
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<Tool>> {
        self.tools.get(name).cloned()
    }

    /// All registered tools, in pool order
    pub fn all(&self) -> IndexMap<String, Arc<Tool>> {
        self.tools.clone()
    }

    /// Tools whose tags contain `tag`, in pool order
    pub fn tools_by_tag(&self, tag: &str) -> IndexMap<String, Arc<Tool>> {
        self.tools
            .iter()
            .filter(|(_, tool)| tool.tags.iter().any(|t| t == tag))
            .map(|(name, tool)| (name.clone(), Arc::clone(tool)))
            .collect()
    }

    /// Resolve a list of names, silently dropping any that are unknown
    ///
    /// Input order is preserved and repeated names are deduplicated. This is
    /// the defense against a model naming tools that do not exist.
    pub fn resolve_names<S: AsRef<str>>(&self, names: &[S]) -> IndexMap<String, Arc<Tool>> {
        let mut resolved = IndexMap::new();
        for name in names {
            let name = name.as_ref();
            if let Some(tool) = self.tools.get(name) {
                resolved.insert(name.to_owned(), Arc::clone(tool));
            } else {
                tracing::debug!(tool = name, "dropping unknown tool name");
            }
        }
        resolved
    }

    /// Materialize a selection as an ordered name -> tool view
    ///
    /// Named selections keep their given order; unknown names are dropped
    /// with a warning rather than failing construction.
    pub fn select(&self, selection: &ToolSelection) -> IndexMap<String, Arc<Tool>> {
        match selection {
            ToolSelection::All => self.all(),
            ToolSelection::Named(names) => {
                let resolved = self.resolve_names(names);
                if resolved.len() < names.len() {
                    tracing::warn!(
                        requested = names.len(),
                        resolved = resolved.len(),
                        "some selected tools are not registered"
                    );
                }
                resolved
            }
        }
    }
}
