use crate::error::{ParseError, SyncError};
use crate::gate::{CompletionGate, GateState};
use crate::graph::NodeGraph;
use crate::render::markup::{self, RenderedMarkup};
use crate::render::{Control, ControlId, ControlSet, Layout, RenderedLine, Segment};
use crate::submit::{self, FormResponses};
use crate::sync::{SyncController, SyncReport};
use ahash::AHashMap;
use itertools::Itertools;

/// A rendered template the operator is filling in.
///
/// A `Form` owns the node graph and every control bound to it. All edits go through
/// [`Form::input`], which keeps every occurrence of a variable identical.
#[derive(Debug, Clone)]
pub struct Form {
    graph: NodeGraph,
    prompts: AHashMap<String, String>,
    controls: ControlSet,
    /// Header in display order, with command labels.
    header: Vec<RenderedLine>,
    /// Header in template order, as written.
    source_header: Vec<RenderedLine>,
    body: Vec<RenderedLine>,
    diagnostics: Vec<ParseError>,
    layout: Layout,
    gate: GateState,
}

impl Form {
    pub(crate) fn new(
        graph: NodeGraph,
        prompts: AHashMap<String, String>,
        controls: ControlSet,
        header: Vec<RenderedLine>,
        source_header: Vec<RenderedLine>,
        body: Vec<RenderedLine>,
        diagnostics: Vec<ParseError>,
        layout: Layout,
    ) -> Self {
        let gate = CompletionGate::recompute(&controls);
        Self {
            graph,
            prompts,
            controls,
            header,
            source_header,
            body,
            diagnostics,
            layout,
            gate,
        }
    }

    /// Applies operator input to one control and fans it out to its siblings.
    pub fn input(&mut self, id: ControlId, value: &str) -> Result<SyncReport, SyncError> {
        let report =
            SyncController::new(&mut self.graph, &mut self.controls, &self.layout).apply(id, value)?;
        self.gate = report.gate.clone();
        Ok(report)
    }

    /// Sets the first control bound to `name`. Convenience for scripted filling.
    pub fn fill(&mut self, name: &str, value: &str) -> Result<SyncReport, SyncError> {
        let id = self
            .controls
            .named(name)
            .map(|c| c.id)
            .next()
            .ok_or_else(|| SyncError::UnboundVariable(name.to_string()))?;
        self.input(id, value)
    }

    /// Highlights the siblings of a focused control. Returns the highlighted controls.
    pub fn focus(&mut self, id: ControlId) -> Result<Vec<ControlId>, SyncError> {
        SyncController::new(&mut self.graph, &mut self.controls, &self.layout).set_linked(id, true)
    }

    pub fn blur(&mut self, id: ControlId) -> Result<Vec<ControlId>, SyncError> {
        SyncController::new(&mut self.graph, &mut self.controls, &self.layout).set_linked(id, false)
    }

    /// Resizes the containing panel; every text control is refitted.
    pub fn set_panel_width(&mut self, width: f32) {
        self.layout.policy.panel_width = width;
        for control in self.controls.iter_mut() {
            self.layout.refresh(control);
        }
    }

    pub fn gate(&self) -> &GateState {
        &self.gate
    }

    pub fn can_submit(&self) -> bool {
        self.gate.is_open()
    }

    pub fn collect_responses(&self) -> FormResponses {
        submit::collect_responses(&self.controls)
    }

    pub fn markup(&self) -> RenderedMarkup {
        RenderedMarkup {
            header_markup: markup::render_lines(&self.header, &self.controls),
            body_markup: markup::render_lines(&self.body, &self.controls),
        }
    }

    /// The filled-in template as plain text, each control replaced by its current value.
    ///
    /// Header lines keep their template order and commands; only `Def:` lines are
    /// dropped. Header and body are separated by a `Msg:` line.
    pub fn preview(&self) -> String {
        let text = |lines: &[RenderedLine]| {
            lines
                .iter()
                .map(|line| {
                    line.segments
                        .iter()
                        .map(|segment| match segment {
                            Segment::Text(text) => text.as_str(),
                            Segment::Control(id) => {
                                self.controls.get(*id).map(Control::value).unwrap_or_default()
                            }
                        })
                        .join("")
                })
                .join("\n")
        };
        format!("{}\nMsg:\n{}", text(&self.source_header), text(&self.body))
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    /// Canonical prompt tag governing `name`.
    pub fn prompt(&self, name: &str) -> Option<&str> {
        self.prompts.get(name).map(String::as_str)
    }

    pub fn controls(&self) -> &ControlSet {
        &self.controls
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.controls.get(id)
    }

    pub fn controls_named<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s Control> + 's {
        self.controls.named(name)
    }

    pub fn header(&self) -> &[RenderedLine] {
        &self.header
    }

    pub fn body(&self) -> &[RenderedLine] {
        &self.body
    }

    pub fn diagnostics(&self) -> &[ParseError] {
        &self.diagnostics
    }
}
