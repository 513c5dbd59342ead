use crate::graph::{Node, NodeGraph, NodeKind};
use crate::lexer::Directive;
use crate::parser::Declaration;
use ahash::AHashMap;

/// Builds the node graph and the canonical prompt table from declarations and tokens.
pub(super) struct GraphBuilder<'a> {
    graph: &'a mut NodeGraph,
    prompts: &'a mut AHashMap<String, String>,
    /// `(declared name, prompt variable, prompt tag)` for every `Def: X=<Ask P>`.
    links: Vec<(String, String, String)>,
}

impl<'a> GraphBuilder<'a> {
    pub(super) fn new(graph: &'a mut NodeGraph, prompts: &'a mut AHashMap<String, String>) -> Self {
        Self {
            graph,
            prompts,
            links: Vec::new(),
        }
    }

    /// First pass: a `Def:` line.
    pub(super) fn declare(&mut self, declaration: &Declaration) {
        self.graph.add_node(Node::new(
            &declaration.name,
            NodeKind::Var,
            &declaration.description,
        ));

        let Some(prompt) = &declaration.prompt else {
            return;
        };
        self.apply_prompt(prompt);
        if prompt.name() != declaration.name {
            // Both names exist at this point.
            let _ = self.graph.link(prompt.name(), &declaration.name);
            self.links.push((
                declaration.name.clone(),
                prompt.name().to_string(),
                prompt.raw().to_string(),
            ));
        }
        self.prompts
            .insert(declaration.name.clone(), prompt.raw().to_string());
    }

    /// Second pass: a directive found in running text.
    pub(super) fn visit(&mut self, directive: &Directive) {
        match directive {
            Directive::Var { name, .. } => {
                if self.graph.ensure_var(name) {
                    tracing::debug!("'{}' referenced without a declaration", name);
                }
            }
            Directive::Ask { .. } | Directive::Select { .. } => self.apply_prompt(directive),
        }
    }

    /// A prompt becomes canonical for its name. A later prompt for the same name wins.
    fn apply_prompt(&mut self, directive: &Directive) {
        let name = directive.name();
        let previous_description = self
            .graph
            .get_node(name)
            .map(|n| n.description.clone())
            .unwrap_or_default();

        let node = match directive {
            Directive::Ask {
                description, flags, ..
            } => Node::new(
                name,
                NodeKind::Ask,
                description.clone().unwrap_or(previous_description),
            )
            .with_flags(*flags),
            Directive::Select { options, .. } => {
                Node::new(name, NodeKind::Select, previous_description).with_options(options.clone())
            }
            Directive::Var { .. } => return,
        };
        self.graph.add_node(node);
        self.prompts
            .insert(name.to_string(), directive.raw().to_string());
    }

    /// Declared names bound to another variable's prompt take that prompt's shape.
    ///
    /// A name whose own `Ask` or `Select` was parsed after its declaration keeps that
    /// prompt; the link still carries values both ways.
    pub(super) fn finish(self) {
        for (name, parent, tag) in &self.links {
            if self.prompts.get(name) != Some(tag) {
                continue;
            }
            let Some(source) = self.graph.get_node(parent).cloned() else {
                continue;
            };
            if let Some(node) = self.graph.get_node_mut(name) {
                node.kind = source.kind;
                node.flags = source.flags;
                node.options = source.options;
                if !source.description.is_empty() {
                    node.description = source.description;
                }
            }
            if let Some(canonical) = self.prompts.get(parent).cloned() {
                self.prompts.insert(name.clone(), canonical);
            }
        }
    }
}
