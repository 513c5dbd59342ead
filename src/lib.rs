//! # formsync - Template Form Engine
//!
//! **formsync** turns small message templates into fillable forms. A template is plain
//! text interleaved with directive tags that declare variables (`<Var NAME>`), prompts
//! (`<Ask PROMPT,FLAGS>`) and selection lists (`<Select NAME:Label=Value,...>`). The
//! operator answers each prompt once; every other occurrence of the same variable
//! follows along live.
//!
//! ## Core Workflow
//!
//! 1.  **Parse**: [`parser::parse`] splits the template at its `Msg:` line, reads the
//!     `Def:` declarations and scans every tag into a [`graph::NodeGraph`].
//! 2.  **Render**: a [`render::Renderer`] turns the parsed state into a [`Form`]: lines of
//!     text and controls, each bound to a variable and tagged with its directive text.
//! 3.  **Edit**: [`Form::input`] applies operator input, upper-cases it where the prompt
//!     asks for it, and copies it to every sibling occurrence in one pass.
//! 4.  **Submit**: once the completion gate is open, [`Form::collect_responses`] yields
//!     the answers keyed by their original tags. A [`session::FormSession`] wraps the
//!     whole exchange with a [`client::FormTransport`].
//!
//! ## Quick Start
//!
//! ```rust
//! use formsync::prelude::*;
//!
//! let state = parse("<Ask CALL,UP>\nMsg:\nHello <Var CALL>");
//! let mut form = Renderer::default().render(state);
//! assert!(!form.can_submit());
//!
//! form.fill("CALL", "n0call").unwrap();
//! assert!(form.controls_named("CALL").all(|c| c.value() == "N0CALL"));
//!
//! let responses = form.collect_responses();
//! assert_eq!(responses.get("<Ask CALL,UP>"), Some("N0CALL"));
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod gate;
pub mod graph;
pub mod lexer;
pub mod parser;
pub mod prelude;
pub mod render;
pub mod session;
pub mod submit;
pub mod sync;

pub use form::Form;
