use crate::error::ParseError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Rendering flags carried by an `Ask` prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptFlags {
    pub multiline: bool,
    pub uppercase: bool,
}

/// One entry of a `Select` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// A directive tag recognised in running template text.
///
/// `raw` is always the verbatim tag text, including the angle brackets. It is the key
/// under which answers are submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Ask {
        raw: String,
        name: String,
        description: Option<String>,
        flags: PromptFlags,
        /// Flags that were present but have no rendering effect.
        extra_flags: Vec<String>,
    },
    Select {
        raw: String,
        name: String,
        options: Vec<SelectOption>,
    },
    Var {
        raw: String,
        name: String,
    },
}

impl Directive {
    pub fn raw(&self) -> &str {
        match self {
            Directive::Ask { raw, .. } | Directive::Select { raw, .. } | Directive::Var { raw, .. } => {
                raw
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Directive::Ask { name, .. }
            | Directive::Select { name, .. }
            | Directive::Var { name, .. } => name,
        }
    }

    /// `Ask` and `Select` are prompts; `Var` only references a value.
    pub fn is_prompt(&self) -> bool {
        !matches!(self, Directive::Var { .. })
    }
}

/// Defines the contract for turning the arguments of one tag keyword into a `Directive`.
pub trait DirectiveParser: Send + Sync {
    fn keyword(&self) -> &str;
    fn parse(&self, raw: &str, args: &str, line: usize) -> Result<Directive, ParseError>;
}

fn malformed(raw: &str, line: usize, message: &str) -> ParseError {
    ParseError::MalformedDirective {
        line,
        tag: raw.to_string(),
        message: message.to_string(),
    }
}

struct AskParser;

impl DirectiveParser for AskParser {
    fn keyword(&self) -> &str {
        "Ask"
    }

    fn parse(&self, raw: &str, args: &str, line: usize) -> Result<Directive, ParseError> {
        let mut tokens = args.split(',').map(str::trim);
        let prompt = tokens.next().unwrap_or_default();
        if prompt.is_empty() {
            return Err(malformed(raw, line, "prompt name is empty"));
        }

        let mut flags = PromptFlags::default();
        let mut extra_flags = Vec::new();
        for token in tokens.filter(|t| !t.is_empty()) {
            if token.eq_ignore_ascii_case("MU") {
                flags.multiline = true;
            } else if token.eq_ignore_ascii_case("UP") || token.eq_ignore_ascii_case("UPPERCASE") {
                flags.uppercase = true;
            } else {
                extra_flags.push(token.to_string());
            }
        }

        Ok(Directive::Ask {
            raw: raw.to_string(),
            name: prompt.to_string(),
            description: parenthesized(prompt),
            flags,
            extra_flags,
        })
    }
}

/// Text between the first `(` and the following `)`, if any.
fn parenthesized(text: &str) -> Option<String> {
    let open = text.find('(')?;
    let close = text[open + 1..].find(')')? + open + 1;
    let inner = text[open + 1..close].trim();
    (!inner.is_empty()).then(|| inner.to_string())
}

struct SelectParser;

impl DirectiveParser for SelectParser {
    fn keyword(&self) -> &str {
        "Select"
    }

    fn parse(&self, raw: &str, args: &str, line: usize) -> Result<Directive, ParseError> {
        let (name, list) = args
            .split_once(':')
            .ok_or_else(|| malformed(raw, line, "expected 'NAME:OPTIONS'"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(malformed(raw, line, "select name is empty"));
        }

        let options: Vec<SelectOption> = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once('=') {
                Some((label, value)) => SelectOption {
                    label: label.trim().to_string(),
                    value: value.trim().to_string(),
                },
                None => SelectOption {
                    label: entry.to_string(),
                    value: entry.to_string(),
                },
            })
            .collect();
        if options.is_empty() {
            return Err(malformed(raw, line, "select has no options"));
        }

        Ok(Directive::Select {
            raw: raw.to_string(),
            name: name.to_string(),
            options,
        })
    }
}

struct VarParser;

impl DirectiveParser for VarParser {
    fn keyword(&self) -> &str {
        "Var"
    }

    fn parse(&self, raw: &str, args: &str, line: usize) -> Result<Directive, ParseError> {
        let name = args.trim();
        if name.is_empty() {
            return Err(malformed(raw, line, "variable name is empty"));
        }
        Ok(Directive::Var {
            raw: raw.to_string(),
            name: name.to_string(),
        })
    }
}

/// Registers the three standard directive parsers, keyed by lowercase keyword.
pub(super) fn register_default_parsers(registry: &mut AHashMap<String, Box<dyn DirectiveParser>>) {
    for parser in [
        Box::new(AskParser) as Box<dyn DirectiveParser>,
        Box::new(SelectParser),
        Box::new(VarParser),
    ] {
        registry.insert(parser.keyword().to_ascii_lowercase(), parser);
    }
}

/// Creates a standard parser by its keyword, case-insensitively.
pub(super) fn create_parser_by_name(keyword: &str) -> Option<Box<dyn DirectiveParser>> {
    match keyword.to_ascii_lowercase().as_str() {
        "ask" => Some(Box::new(AskParser)),
        "select" => Some(Box::new(SelectParser)),
        "var" => Some(Box::new(VarParser)),
        _ => None,
    }
}
