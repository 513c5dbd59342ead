//! Template parsing: section split, declarations, then a tag scan that builds the graph.

use crate::error::ParseError;
use crate::graph::NodeGraph;
use crate::lexer::{Directive, Lexer, Token};
use ahash::AHashMap;

mod builder;

use builder::GraphBuilder;

/// A header or body line after lexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLine {
    /// 1-based line number in the normalized template.
    pub number: usize,
    pub raw: String,
    pub tokens: Vec<Token>,
}

impl TemplateLine {
    /// The header command of the line (`To` in `To: ...`), if it has one.
    pub fn command(&self) -> Option<&str> {
        let (command, _) = self.raw.split_once(':')?;
        let command = command.trim();
        let plain = !command.is_empty()
            && !command.contains(|c: char| c.is_whitespace() || c == '<' || c == '>');
        plain.then_some(command)
    }

    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Directive(directive) => Some(directive),
            Token::Text(_) => None,
        })
    }
}

/// A `Def: NAME=<DESCRIPTION>` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub line: usize,
    pub name: String,
    pub description: String,
    /// An `Ask` or `Select` given inline as the declaration's value.
    pub prompt: Option<Directive>,
}

/// Everything known about a template after parsing, before rendering.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub graph: NodeGraph,
    /// Canonical prompt tag text per variable name.
    pub prompts: AHashMap<String, String>,
    pub declarations: Vec<Declaration>,
    /// Header lines in template order, declarations excluded.
    pub header: Vec<TemplateLine>,
    pub body: Vec<TemplateLine>,
    pub diagnostics: Vec<ParseError>,
}

impl SessionState {
    /// Canonical prompt tag governing `name`.
    pub fn prompt(&self, name: &str) -> Option<&str> {
        self.prompts.get(name).map(String::as_str)
    }

    /// Carries over every non-empty value of `previous` whose name still exists.
    pub fn restore_values(&mut self, previous: &NodeGraph) {
        for node in previous.iter().filter(|n| !n.value().is_empty()) {
            if self.graph.contains(&node.name) {
                // The name was just checked.
                let _ = self.graph.update_value(&node.name, node.value());
            }
        }
    }
}

#[derive(Default)]
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lexer(lexer: Lexer) -> Self {
        Self { lexer }
    }

    pub fn parse(&self, text: &str) -> SessionState {
        let text = normalize_line_endings(text);
        let (header_lines, body_lines) = split_sections(&text);
        let mut state = SessionState::default();

        let mut header_rest = Vec::new();
        for (number, line) in header_lines {
            if !is_declaration(line) {
                header_rest.push((number, line));
                continue;
            }
            match self.parse_declaration(line, number) {
                Ok(declaration) => state.declarations.push(declaration),
                Err(err) => {
                    tracing::warn!("Skipping declaration: {}", err);
                    state.diagnostics.push(err);
                }
            }
        }

        state.header = self.lex_lines(header_rest, &mut state.diagnostics);
        state.body = self.lex_lines(body_lines, &mut state.diagnostics);

        let mut builder = GraphBuilder::new(&mut state.graph, &mut state.prompts);
        for declaration in &state.declarations {
            builder.declare(declaration);
        }
        for line in state.header.iter().chain(&state.body) {
            for directive in line.directives() {
                builder.visit(directive);
            }
        }
        builder.finish();

        tracing::debug!(
            "Parsed template: {} variable(s), {} prompt(s), {} header line(s), {} body line(s), {} diagnostic(s)",
            state.graph.len(),
            state.prompts.len(),
            state.header.len(),
            state.body.len(),
            state.diagnostics.len()
        );
        state
    }

    fn lex_lines(
        &self,
        lines: Vec<(usize, &str)>,
        diagnostics: &mut Vec<ParseError>,
    ) -> Vec<TemplateLine> {
        lines
            .into_iter()
            .map(|(number, raw)| {
                let lexed = self.lexer.lex_line(raw, number);
                diagnostics.extend(lexed.diagnostics);
                TemplateLine {
                    number,
                    raw: raw.to_string(),
                    tokens: lexed.tokens,
                }
            })
            .collect()
    }

    fn parse_declaration(&self, line: &str, number: usize) -> Result<Declaration, ParseError> {
        let rest = line.trim_start()[4..].trim();
        let (name, value) = rest
            .split_once('=')
            .ok_or_else(|| ParseError::MissingAssignment {
                line: number,
                text: line.to_string(),
            })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseError::EmptyDeclarationName {
                line: number,
                text: line.to_string(),
            });
        }
        let value = value.trim();

        let prompt = self
            .lexer
            .lex_line(value, number)
            .tokens
            .into_iter()
            .find_map(|token| match token {
                Token::Directive(directive) if directive.is_prompt() => Some(directive),
                _ => None,
            });

        let description = match &prompt {
            Some(Directive::Ask {
                name, description, ..
            }) => description.clone().unwrap_or_else(|| name.clone()),
            Some(directive) => directive.name().to_string(),
            None => value
                .strip_prefix('<')
                .and_then(|v| v.strip_suffix('>'))
                .unwrap_or(value)
                .trim()
                .to_string(),
        };

        Ok(Declaration {
            line: number,
            name: name.to_string(),
            description,
            prompt,
        })
    }
}

/// Parses a template with the standard directive set.
pub fn parse(text: &str) -> SessionState {
    Parser::new().parse(text)
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn is_declaration(line: &str) -> bool {
    line.trim_start()
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("def:"))
}

type NumberedLines<'t> = Vec<(usize, &'t str)>;

/// Splits at the first line reading `Msg:`. Without one, the whole template is header.
fn split_sections(text: &str) -> (NumberedLines<'_>, NumberedLines<'_>) {
    let lines: NumberedLines<'_> = text.split('\n').enumerate().map(|(i, l)| (i + 1, l)).collect();
    match lines
        .iter()
        .position(|(_, line)| line.trim().eq_ignore_ascii_case("msg:"))
    {
        Some(index) => {
            let mut header = lines;
            let body = header.split_off(index + 1);
            header.pop();
            (header, body)
        }
        None => (lines, Vec::new()),
    }
}
