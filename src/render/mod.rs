//! Turns a parsed template into a live [`Form`]: lines of text and bound controls.

use crate::form::Form;
use crate::graph::{Node, NodeGraph, NodeKind};
use crate::lexer::{Directive, Token};
use crate::parser::{SessionState, TemplateLine};
use ahash::AHashMap;
use itertools::Itertools;

mod control;
mod layout;
pub mod markup;

pub use control::{Control, ControlId, ControlKind, ControlSet, Occurrence};
pub use layout::{FontMetrics, Layout, MonospaceMetrics, WidthPolicy};
pub use markup::RenderedMarkup;

/// A piece of a rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Control(ControlId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// Line number in the normalized template.
    pub number: usize,
    pub segments: Vec<Segment>,
}

/// Header commands shown under a friendlier label.
const COMMAND_LABELS: &[(&str, &str)] = &[
    ("Type", "Message Type"),
    ("To", "To"),
    ("CC", "CC"),
    ("Cc", "CC"),
    ("Subj", "Subject"),
    ("Subject", "Subject"),
    ("Attach", "Attachments"),
    ("SeqSet", "Sequence Number"),
    ("SeqInc", "Increment Sequence"),
    ("Readonly", "Read Only"),
    ("Form", "Form Names"),
    ("ReplyTemplate", "Reply Template"),
];

fn command_label(command: &str) -> Option<&'static str> {
    COMMAND_LABELS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, label)| *label)
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    layout: Layout,
}

impl Renderer {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn render(&self, state: SessionState) -> Form {
        let SessionState {
            mut graph,
            prompts,
            header,
            body,
            diagnostics,
            ..
        } = state;
        let mut controls = ControlSet::default();

        let (source_header, body) = {
            let mut pass = RenderPass {
                graph: &mut graph,
                prompts: &prompts,
                controls: &mut controls,
                layout: &self.layout,
            };
            (
                header.iter().map(|line| pass.render_line(line)).collect_vec(),
                body.iter().map(|line| pass.render_line(line)).collect_vec(),
            )
        };
        let display_header = header
            .iter()
            .zip(&source_header)
            .sorted_by_key(|(line, _)| header_rank(line))
            .map(|(line, rendered)| label_line(line, rendered))
            .collect_vec();

        tracing::debug!(
            "Rendered {} control(s) for {} variable(s)",
            controls.len(),
            graph.len()
        );
        Form::new(
            graph,
            prompts,
            controls,
            display_header,
            source_header,
            body,
            diagnostics,
            self.layout.clone(),
        )
    }
}

/// Display rank of a header line: "To" lines first, then "subject" lines, then the rest.
fn header_rank(line: &TemplateLine) -> u8 {
    match line.command() {
        Some(c) if c.eq_ignore_ascii_case("to") => 0,
        Some(c) if c.eq_ignore_ascii_case("subj") || c.eq_ignore_ascii_case("subject") => 1,
        _ => 2,
    }
}

/// Copy of `rendered` with a known header command replaced by its label.
fn label_line(line: &TemplateLine, rendered: &RenderedLine) -> RenderedLine {
    let mut labelled = rendered.clone();
    let label = line.command().and_then(command_label);
    if let (Some(label), Some(Segment::Text(text))) = (label, labelled.segments.first_mut()) {
        *text = relabel(text, label);
    }
    labelled
}

struct RenderPass<'a> {
    graph: &'a mut NodeGraph,
    prompts: &'a AHashMap<String, String>,
    controls: &'a mut ControlSet,
    layout: &'a Layout,
}

impl RenderPass<'_> {
    fn render_line(&mut self, line: &TemplateLine) -> RenderedLine {
        let segments = line
            .tokens
            .iter()
            .map(|token| match token {
                Token::Text(text) => Segment::Text(text.clone()),
                Token::Directive(directive) => Segment::Control(self.render_directive(directive)),
            })
            .collect();

        RenderedLine {
            number: line.number,
            segments,
        }
    }

    fn render_directive(&mut self, directive: &Directive) -> ControlId {
        let name = directive.name();
        // Every scanned directive has a node.
        let node = self
            .graph
            .get_node(name)
            .cloned()
            .unwrap_or_else(|| Node::new(name, NodeKind::Var, ""));

        let mut control = match directive {
            Directive::Ask {
                raw,
                description,
                flags,
                ..
            } => {
                let kind = if flags.multiline {
                    ControlKind::TextArea
                } else {
                    ControlKind::Text
                };
                let mut control = Control::new(kind, Occurrence::Ask, name, raw);
                control.placeholder = description
                    .clone()
                    .unwrap_or_else(|| placeholder_for(&node));
                control.uppercase = flags.uppercase || node.flags.uppercase;
                control.submission_key = Some(raw.clone());
                control
            }
            Directive::Select { raw, options, .. } => {
                let mut control = Control::new(ControlKind::Choice, Occurrence::Select, name, raw);
                control.options = options.clone();
                control.submission_key = Some(raw.clone());
                control
            }
            Directive::Var { raw, .. } => {
                let kind = if node.flags.multiline {
                    ControlKind::TextArea
                } else {
                    ControlKind::Text
                };
                let mut control = Control::new(kind, Occurrence::Var, name, raw);
                control.placeholder = placeholder_for(&node);
                control.uppercase = node.flags.uppercase;
                control.submission_key = self.prompts.get(name).cloned();
                control
            }
        };

        control.assign(node.value());
        self.layout.refresh(&mut control);
        let id = self.controls.push(control);
        if self.graph.observe(name, id).is_err() {
            tracing::warn!("Control for undeclared variable '{}' will not sync", name);
        }
        id
    }
}

fn placeholder_for(node: &Node) -> String {
    if node.description.is_empty() {
        node.name.clone()
    } else {
        node.description.clone()
    }
}

/// Replaces the command before the first `:` with its label.
fn relabel(text: &str, label: &str) -> String {
    match text.split_once(':') {
        Some((_, rest)) => format!("{label}:{rest}"),
        None => text.to_string(),
    }
}
