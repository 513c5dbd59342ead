//! The node graph: one authoritative record per variable name.
//!
//! [`NodeGraph::update_value`] is the only way a value changes. It returns a
//! [`Propagation`] listing every node it touched and every control observing those
//! nodes, which is what the sync controller uses to fan an edit out.

use crate::error::GraphError;
use crate::render::ControlId;
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;

mod node;

pub use node::{Node, NodeKind};

/// What a single `update_value` call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Names whose value changed, starting with the updated node.
    pub nodes: Vec<String>,
    /// Every control bound to one of `nodes`, in discovery order.
    pub observers: Vec<ControlId>,
}

impl Propagation {
    /// `true` when the value was already current and nothing changed.
    pub fn is_noop(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeGraph {
    nodes: AHashMap<String, Node>,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, replacing kind, description, options and flags of an existing one.
    ///
    /// A value already entered for the name, the controls observing it and its links
    /// survive the re-declaration.
    pub fn add_node(&mut self, mut node: Node) {
        if let Some(previous) = self.nodes.remove(&node.name) {
            node.inherit_from(previous);
        }
        self.nodes.insert(node.name.clone(), node);
    }

    /// Creates an undeclared `var` node for `name` unless one exists. Returns `true` if created.
    pub fn ensure_var(&mut self, name: &str) -> bool {
        if self.nodes.contains_key(name) {
            return false;
        }
        self.nodes
            .insert(name.to_string(), Node::new(name, NodeKind::Var, ""));
        true
    }

    pub fn get_node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub(crate) fn get_node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Variable names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Makes `child` mirror the value of `parent` (and vice versa on edits to `child`).
    pub fn link(&mut self, parent: &str, child: &str) -> Result<(), GraphError> {
        if parent == child {
            return Ok(());
        }
        for name in [parent, child] {
            if !self.contains(name) {
                return Err(GraphError::UnknownNode(name.to_string()));
            }
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.insert(child.to_string());
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parents.insert(parent.to_string());
        }
        Ok(())
    }

    /// `name` and every node reachable from it through links, each once.
    pub fn linked(&self, name: &str) -> Vec<&Node> {
        let mut found = Vec::new();
        let mut visited: AHashSet<&str> = AHashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([name]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            found.push(node);
            queue.extend(node.parents.iter().chain(&node.children).map(String::as_str));
        }
        found
    }

    /// Registers a control that must be notified when `name` changes.
    pub fn observe(&mut self, name: &str, id: ControlId) -> Result<(), GraphError> {
        self.nodes
            .get_mut(name)
            .map(|node| node.add_observer(id))
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
    }

    /// Sets the value of `name` and of every node linked to it.
    ///
    /// Nothing happens if `name` already holds `value`. Each linked node is visited once,
    /// so link cycles cannot recurse.
    pub fn update_value(&mut self, name: &str, value: &str) -> Result<Propagation, GraphError> {
        let node = self
            .nodes
            .get(name)
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))?;
        if node.value() == value {
            return Ok(Propagation::default());
        }

        let mut propagation = Propagation::default();
        let mut visited: AHashSet<String> = AHashSet::new();
        let mut queue: VecDeque<String> = VecDeque::from([name.to_string()]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let Some(node) = self.nodes.get_mut(&current) else {
                continue;
            };
            if node.value() != value {
                node.set_value(value);
                propagation.nodes.push(current.clone());
            }
            for id in node.observers() {
                if !propagation.observers.contains(id) {
                    propagation.observers.push(*id);
                }
            }

            let mut linked: Vec<&String> = node.parents.iter().chain(&node.children).collect();
            linked.sort_unstable();
            queue.extend(linked.into_iter().cloned());
        }

        tracing::debug!(
            "'{}' updated, {} node(s) and {} control(s) affected",
            name,
            propagation.nodes.len(),
            propagation.observers.len()
        );
        Ok(propagation)
    }
}
