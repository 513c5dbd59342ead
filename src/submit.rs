//! Collecting answers for submission.

use crate::render::ControlSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The submission body: `{"responses": {"<original tag>": "answer", ...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormResponses {
    pub responses: BTreeMap<String, String>,
}

impl FormResponses {
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.responses.get(tag).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// One entry per prompt-bearing control that has a value, keyed by its governing tag.
///
/// Blank controls are left out rather than sent as empty strings. Occurrences of the
/// same variable share a key and, being synchronized, a value.
pub fn collect_responses(controls: &ControlSet) -> FormResponses {
    let responses = controls
        .iter()
        .filter(|c| !c.value().is_empty())
        .filter_map(|c| {
            c.submission_key
                .as_ref()
                .map(|key| (key.clone(), c.value().to_string()))
        })
        .collect();
    FormResponses { responses }
}
