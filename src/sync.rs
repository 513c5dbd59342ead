//! Live synchronization of variable occurrences.
//!
//! An edit is applied in one pass: transform, write through the graph, then copy the
//! result into the controls the graph reports as observers. Copies never re-enter the
//! controller, so there is no event recursion to guard against.

use crate::error::{GraphError, SyncError};
use crate::gate::{CompletionGate, GateState};
use crate::graph::NodeGraph;
use crate::render::{ControlId, ControlKind, ControlSet, Layout};

/// Outcome of one input event.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub source: ControlId,
    /// The value after transformation, as shown in every occurrence.
    pub value: String,
    /// Sibling controls that received the value, in render order of discovery.
    pub updated: Vec<ControlId>,
    /// `false` when the variable already held the value.
    pub propagated: bool,
    /// Completion state after the edit.
    pub gate: GateState,
}

pub struct SyncController<'a> {
    graph: &'a mut NodeGraph,
    controls: &'a mut ControlSet,
    layout: &'a Layout,
}

impl<'a> SyncController<'a> {
    pub fn new(graph: &'a mut NodeGraph, controls: &'a mut ControlSet, layout: &'a Layout) -> Self {
        Self {
            graph,
            controls,
            layout,
        }
    }

    pub fn apply(&mut self, id: ControlId, raw: &str) -> Result<SyncReport, SyncError> {
        let control = self
            .controls
            .get(id)
            .ok_or_else(|| SyncError::UnknownControl(id.to_string()))?;
        let name = control.name.clone();
        if !self.graph.contains(&name) {
            return Err(GraphError::UnknownNode(name).into());
        }

        // An upper-case prompt anywhere among the linked variables applies to the edit.
        let uppercase =
            control.uppercase || self.graph.linked(&name).iter().any(|n| n.flags.uppercase);
        let value = if uppercase {
            raw.to_uppercase()
        } else {
            raw.to_string()
        };
        if control.kind == ControlKind::Choice && !value.is_empty() && !control.offers(&value) {
            return Err(SyncError::UnknownOption {
                control: control.element_id.clone(),
                value,
            });
        }

        self.show(id, &value);
        let propagation = self.graph.update_value(&name, &value)?;

        let mut updated = Vec::new();
        for observer in propagation.observers.iter().copied().filter(|&o| o != id) {
            self.show(observer, &value);
            updated.push(observer);
        }

        Ok(SyncReport {
            source: id,
            propagated: !propagation.is_noop(),
            value,
            updated,
            gate: CompletionGate::recompute(self.controls),
        })
    }

    /// Sets the cosmetic highlight on every sibling of `id`.
    pub fn set_linked(&mut self, id: ControlId, linked: bool) -> Result<Vec<ControlId>, SyncError> {
        let name = self
            .controls
            .get(id)
            .map(|c| c.name.clone())
            .ok_or_else(|| SyncError::UnknownControl(id.to_string()))?;
        let siblings: Vec<ControlId> = self
            .graph
            .get_node(&name)
            .ok_or(GraphError::UnknownNode(name))?
            .observers()
            .iter()
            .copied()
            .filter(|&o| o != id)
            .collect();

        for sibling in &siblings {
            if let Some(control) = self.controls.get_mut(*sibling) {
                control.linked = linked;
            }
        }
        Ok(siblings)
    }

    fn show(&mut self, id: ControlId, value: &str) {
        if let Some(control) = self.controls.get_mut(id) {
            control.assign(value);
            self.layout.refresh(control);
        }
    }
}
