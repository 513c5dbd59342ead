//! Splits template lines into a flat stream of literal text and directive tokens.
//!
//! The lexer knows nothing about variables or the node graph. Anything between `<` and
//! `>` whose first word is a registered keyword is handed to that keyword's
//! [`DirectiveParser`]; everything else, including tags that fail to parse, stays
//! literal text.

use crate::error::ParseError;
use ahash::AHashMap;

mod directive;

pub use directive::{Directive, DirectiveParser, PromptFlags, SelectOption};

use directive::{create_parser_by_name, register_default_parsers};

/// One lexical unit of a template line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Directive(Directive),
}

/// The result of lexing a single line.
#[derive(Debug, Clone, Default)]
pub struct LexedLine {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<ParseError>,
}

pub struct Lexer {
    registry: AHashMap<String, Box<dyn DirectiveParser>>,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    pub fn new() -> Self {
        let mut registry: AHashMap<String, Box<dyn DirectiveParser>> = AHashMap::new();
        register_default_parsers(&mut registry);
        Self { registry }
    }

    /// Makes `alias` behave exactly like the standard keyword `keyword` (`Ask`, `Select` or `Var`).
    pub fn with_keyword_alias(mut self, alias: &str, keyword: &str) -> Self {
        if let Some(parser) = create_parser_by_name(keyword) {
            self.registry.insert(alias.to_ascii_lowercase(), parser);
        }
        self
    }

    pub fn with_custom_parser(mut self, parser: Box<dyn DirectiveParser>) -> Self {
        self.registry
            .insert(parser.keyword().to_ascii_lowercase(), parser);
        self
    }

    /// Lexes one line. `line` is the 1-based line number used in diagnostics.
    pub fn lex_line(&self, text: &str, line: usize) -> LexedLine {
        let mut lexed = LexedLine::default();
        let mut cursor = 0usize;
        let mut text_start = 0usize;

        while let Some(offset) = text[cursor..].find('<') {
            let open = cursor + offset;
            let Some(close) = text[open..].find('>').map(|i| open + i) else {
                if self.keyword_at(&text[open + 1..]).is_some() {
                    lexed.diagnostics.push(ParseError::UnterminatedDirective {
                        line,
                        fragment: text[open..].to_string(),
                    });
                }
                break;
            };

            let inner = &text[open + 1..close];
            let Some((parser, args)) = self.keyword_at(inner) else {
                cursor = open + 1;
                continue;
            };

            let raw = &text[open..=close];
            match parser.parse(raw, args, line) {
                Ok(directive) => {
                    push_text(&mut lexed.tokens, &text[text_start..open]);
                    lexed.tokens.push(Token::Directive(directive));
                    text_start = close + 1;
                }
                Err(err) => {
                    tracing::warn!("{}", err);
                    lexed.diagnostics.push(err);
                }
            }
            cursor = close + 1;
        }

        push_text(&mut lexed.tokens, &text[text_start..]);
        lexed
    }

    /// Matches `KEYWORD<whitespace>ARGS` or a bare `KEYWORD` against the registry.
    fn keyword_at<'t>(&self, inner: &'t str) -> Option<(&dyn DirectiveParser, &'t str)> {
        let (keyword, args) = match inner.find(char::is_whitespace) {
            Some(split) => inner.split_at(split),
            None => (inner, ""),
        };
        let parser = self.registry.get(&keyword.to_ascii_lowercase())?;
        Some((parser.as_ref(), args.trim_start()))
    }
}

fn push_text(tokens: &mut Vec<Token>, text: &str) {
    if text.is_empty() {
        return;
    }
    match tokens.last_mut() {
        Some(Token::Text(existing)) => existing.push_str(text),
        _ => tokens.push(Token::Text(text.to_string())),
    }
}
