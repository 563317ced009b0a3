//! Task descriptors passed into tool recommendation

use serde::{Deserialize, Serialize};

/// A structured unit of work the agent is about to perform
///
/// `instruction` drives lexical recall and the ranking prompt; `task_type`
/// drives tag-based recall when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Natural-language instruction for the task
    pub instruction: String,
    /// Categorical task type matched against tool tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
}

impl Task {
    /// Create a task with no categorical type
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            task_type: None,
        }
    }

    /// Attach a categorical task type
    #[must_use]
    pub fn with_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }
}
