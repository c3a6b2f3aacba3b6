use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::models::progress::is_truthy;

/// `{ "<screenId>": true }` map of tutorials the learner has already seen.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct InstructionFlags(JsonMap<String, JsonValue>);

impl InstructionFlags {
    pub fn is_seen(&self, screen_id: &str) -> bool {
        self.0.get(screen_id).map_or(false, is_truthy)
    }

    pub fn mark_seen(&mut self, screen_id: &str) {
        self.0.insert(screen_id.to_string(), JsonValue::Bool(true));
    }
}
