use crate::lexer::SelectOption;
use ahash::AHashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTROL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a rendered control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(u64);

impl ControlId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CONTROL_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Single-line text input.
    Text,
    /// Multi-line text input.
    TextArea,
    /// Drop-down with a leading "Choose NAME" placeholder.
    Choice,
}

/// Which directive produced a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    Ask,
    Select,
    Var,
}

impl Occurrence {
    fn prefix(self) -> &'static str {
        match self {
            Occurrence::Ask => "ask",
            Occurrence::Select => "select",
            Occurrence::Var => "var",
        }
    }
}

/// One interactive occurrence of a variable.
#[derive(Debug, Clone)]
pub struct Control {
    pub id: ControlId,
    /// Element id, e.g. `var_12`.
    pub element_id: String,
    pub kind: ControlKind,
    pub occurrence: Occurrence,
    /// Variable this control is bound to.
    pub name: String,
    /// Verbatim tag this control was rendered from.
    pub directive: String,
    /// Tag text of the governing prompt; `None` for a `Var` no prompt governs.
    pub submission_key: Option<String>,
    pub placeholder: String,
    pub uppercase: bool,
    pub options: Vec<SelectOption>,
    pub width: Option<f32>,
    /// Cosmetic highlight while a sibling has focus.
    pub linked: bool,
    value: String,
}

impl Control {
    pub(crate) fn new(kind: ControlKind, occurrence: Occurrence, name: &str, directive: &str) -> Self {
        let id = ControlId::next();
        Self {
            id,
            element_id: format!("{}_{}", occurrence.prefix(), id),
            kind,
            occurrence,
            name: name.to_string(),
            directive: directive.to_string(),
            submission_key: None,
            placeholder: name.to_string(),
            uppercase: false,
            options: Vec::new(),
            width: None,
            linked: false,
            value: String::new(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Prompt-bearing controls gate and feed the submission.
    pub fn is_prompt_bearing(&self) -> bool {
        self.submission_key.is_some()
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn offers(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }

    /// Shows `value`. A choice control that does not offer it falls back to its placeholder.
    pub(crate) fn assign(&mut self, value: &str) {
        self.value.clear();
        if self.kind != ControlKind::Choice || self.offers(value) {
            self.value.push_str(value);
        }
    }

    /// Text used to size the control: its value, or the placeholder when empty.
    pub fn display_text(&self) -> &str {
        if self.value.is_empty() {
            &self.placeholder
        } else {
            &self.value
        }
    }
}

/// All controls of a rendered form, in render order.
#[derive(Debug, Clone, Default)]
pub struct ControlSet {
    controls: Vec<Control>,
    index: AHashMap<ControlId, usize>,
}

impl ControlSet {
    pub(crate) fn push(&mut self, control: Control) -> ControlId {
        let id = control.id;
        self.index.insert(id, self.controls.len());
        self.controls.push(control);
        id
    }

    pub fn get(&self, id: ControlId) -> Option<&Control> {
        self.index.get(&id).map(|&i| &self.controls[i])
    }

    pub(crate) fn get_mut(&mut self, id: ControlId) -> Option<&mut Control> {
        self.index.get(&id).map(|&i| &mut self.controls[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Control> {
        self.controls.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Control> {
        self.controls.iter_mut()
    }

    /// Controls bound to `name`, in render order.
    pub fn named<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s Control> + 's {
        self.controls.iter().filter(move |c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}
