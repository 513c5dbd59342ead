//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the formsync crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use formsync::prelude::*;
//!
//! # async fn run_example() -> Result<()> {
//! let config = FormConfig::from_file("path/to/config.json")?;
//! let transport = HttpTransport::new(&config)?;
//! let query = QueryContext::from_raw("template=ICS213.txt");
//!
//! let mut session = FormSession::open(transport, query, &config).await;
//! if let Some(form) = session.form_mut() {
//!     form.fill("CALL", "N0CALL")?;
//! }
//! session.submit().await?;
//! # Ok(())
//! # }
//! ```

// Parsing and rendering
pub use crate::form::Form;
pub use crate::parser::{Parser, SessionState, parse};
pub use crate::render::{Control, ControlId, ControlKind, Renderer};

// Graph
pub use crate::graph::{Node, NodeGraph, NodeKind};

// Editing and submission
pub use crate::gate::{CompletionGate, GateState};
pub use crate::submit::FormResponses;
pub use crate::sync::SyncReport;

// Sessions and transport
pub use crate::client::{FormTransport, HttpTransport, QueryContext};
pub use crate::config::FormConfig;
pub use crate::session::{FormSession, SessionPhase};

// Error types
pub use crate::error::{ClientError, ConfigError, ParseError, SessionError, SyncError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
