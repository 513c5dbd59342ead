use crate::lexer::{PromptFlags, SelectOption};
use crate::render::ControlId;
use ahash::AHashSet;
use std::fmt;

/// The kind of directive that last defined a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Var,
    Ask,
    Select,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Var => write!(f, "var"),
            NodeKind::Ask => write!(f, "ask"),
            NodeKind::Select => write!(f, "select"),
        }
    }
}

/// The in-memory record of one template variable.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub description: String,
    pub options: Vec<SelectOption>,
    pub flags: PromptFlags,
    /// Names whose value this node mirrors.
    pub parents: AHashSet<String>,
    /// Names that mirror this node's value.
    pub children: AHashSet<String>,
    value: String,
    observers: Vec<ControlId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            options: Vec::new(),
            flags: PromptFlags::default(),
            parents: AHashSet::new(),
            children: AHashSet::new(),
            value: String::new(),
            observers: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_flags(mut self, flags: PromptFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Controls bound to this variable, in render order.
    pub fn observers(&self) -> &[ControlId] {
        &self.observers
    }

    pub(super) fn set_value(&mut self, value: &str) {
        self.value.clear();
        self.value.push_str(value);
    }

    pub(super) fn add_observer(&mut self, id: ControlId) {
        if !self.observers.contains(&id) {
            self.observers.push(id);
        }
    }

    /// Takes over the state a re-declaration must not lose.
    pub(super) fn inherit_from(&mut self, previous: Node) {
        self.value = previous.value;
        self.observers = previous.observers;
        self.parents.extend(previous.parents);
        self.children.extend(previous.children);
    }
}
