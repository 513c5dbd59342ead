use thiserror::Error;

/// Problems found while reading a template.
///
/// None of these abort a parse: the offending declaration or tag is skipped (or kept as
/// literal text) and the error is recorded as a diagnostic on the parsed state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Line {line}: declaration '{text}' is missing '='")]
    MissingAssignment { line: usize, text: String },

    #[error("Line {line}: declaration '{text}' has an empty variable name")]
    EmptyDeclarationName { line: usize, text: String },

    #[error("Line {line}: directive '{tag}' is malformed: {message}")]
    MalformedDirective {
        line: usize,
        tag: String,
        message: String,
    },

    #[error("Line {line}: directive starting with '{fragment}' is never closed")]
    UnterminatedDirective { line: usize, fragment: String },
}

/// Errors raised by the node graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Variable '{0}' is not declared in this template")]
    UnknownNode(String),
}

/// Errors raised while applying operator input to the rendered form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("No control with id '{0}' exists in this form")]
    UnknownControl(String),

    #[error("No control is bound to variable '{0}'")]
    UnboundVariable(String),

    #[error("Value '{value}' is not one of the options offered by '{control}'")]
    UnknownOption { control: String, value: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors raised by the template/submission transport.
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("Invalid endpoint URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Failed to fetch template: {status}")]
    FetchRejected { status: String },

    /// The server's body text is surfaced verbatim to the operator.
    #[error("{body}")]
    SubmitRejected { status: u16, body: String },
}

/// Errors raised by a form session.
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    #[error("Cannot {action} while the form is {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: &'static str,
    },

    #[error("Form is incomplete: {0} prompt(s) still empty")]
    Incomplete(usize),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
