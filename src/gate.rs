use crate::render::{ControlId, ControlSet};

/// Whether the form may be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Open,
    /// Prompt-bearing controls that are still empty or whitespace-only.
    Blocked { pending: Vec<ControlId> },
}

impl GateState {
    pub fn is_open(&self) -> bool {
        matches!(self, GateState::Open)
    }

    pub fn pending(&self) -> &[ControlId] {
        match self {
            GateState::Open => &[],
            GateState::Blocked { pending } => pending,
        }
    }
}

/// Decides submission availability from the prompt-bearing controls.
pub struct CompletionGate;

impl CompletionGate {
    /// A form without prompts is always open.
    pub fn recompute(controls: &ControlSet) -> GateState {
        let pending: Vec<ControlId> = controls
            .iter()
            .filter(|c| c.is_prompt_bearing() && c.is_blank())
            .map(|c| c.id)
            .collect();

        if pending.is_empty() {
            GateState::Open
        } else {
            GateState::Blocked { pending }
        }
    }
}
