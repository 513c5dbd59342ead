use crate::client::{FormTransport, QueryContext, bounded};
use crate::config::FormConfig;
use crate::error::{ClientError, SessionError};
use crate::form::Form;
use crate::graph::NodeGraph;
use crate::parser::Parser;
use crate::render::Renderer;
use std::fmt;
use std::time::Duration;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for the template.
    Loading,
    /// Rendered and editable.
    Ready,
    /// Submission in flight; editing and submitting are disabled.
    Submitting,
    /// The template could not be fetched. No controls exist.
    Failed,
    /// Submitted or cancelled.
    Closed,
}

impl SessionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Loading => "loading",
            SessionPhase::Ready => "ready",
            SessionPhase::Submitting => "submitting",
            SessionPhase::Failed => "failed",
            SessionPhase::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One form edit, from template fetch to submission.
///
/// The session owns its transport, the forwarded query context and the rendered form.
/// Independent sessions share nothing.
pub struct FormSession<T: FormTransport> {
    transport: T,
    query: QueryContext,
    parser: Parser,
    renderer: Renderer,
    timeout: Duration,
    phase: SessionPhase,
    form: Option<Form>,
    /// Values of a form dropped by a failed fetch, restored by the next successful one.
    last_values: Option<NodeGraph>,
    error: Option<String>,
}

impl<T: FormTransport> FormSession<T> {
    pub fn new(transport: T, query: QueryContext, config: &FormConfig) -> Self {
        Self {
            transport,
            query,
            parser: Parser::new(),
            renderer: Renderer::new(config.layout()),
            timeout: config.request_timeout(),
            phase: SessionPhase::Loading,
            form: None,
            last_values: None,
            error: None,
        }
    }

    /// Creates a session and fetches its template.
    ///
    /// A failed fetch does not return an error: the session ends up `Failed` with an
    /// inline message and no controls.
    pub async fn open(transport: T, query: QueryContext, config: &FormConfig) -> Self {
        let mut session = Self::new(transport, query, config);
        session.load().await;
        session
    }

    /// Fetches the template again. Values already entered are kept for names that still exist.
    pub async fn retry(&mut self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Failed | SessionPhase::Ready => {
                self.load().await;
                Ok(())
            }
            phase => Err(SessionError::InvalidPhase {
                action: "reload the template",
                phase: phase.as_str(),
            }),
        }
    }

    /// Replaces the form with a re-parse of `text`, keeping entered values.
    pub fn reload(&mut self, text: &str) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Loading | SessionPhase::Failed | SessionPhase::Ready => {
                self.install(text);
                Ok(())
            }
            phase => Err(SessionError::InvalidPhase {
                action: "reload the template",
                phase: phase.as_str(),
            }),
        }
    }

    async fn load(&mut self) {
        self.phase = SessionPhase::Loading;
        match bounded(self.timeout, self.transport.fetch_template(&self.query)).await {
            Ok(text) => {
                tracing::info!("Fetched template ({} bytes)", text.len());
                self.install(&text);
            }
            Err(err) => {
                tracing::error!("Template fetch failed: {}", err);
                if let Some(form) = self.form.take() {
                    self.last_values = Some(form.graph().clone());
                }
                self.error = Some(format!("Failed to process template: {}", err));
                self.phase = SessionPhase::Failed;
            }
        }
    }

    fn install(&mut self, text: &str) {
        let mut state = self.parser.parse(text);
        let previous = self.form.as_ref().map(Form::graph).or(self.last_values.as_ref());
        if let Some(previous) = previous {
            state.restore_values(previous);
        }
        self.last_values = None;
        self.form = Some(self.renderer.render(state));
        self.error = None;
        self.phase = SessionPhase::Ready;
    }

    /// Posts the collected responses.
    ///
    /// Success closes the session. On failure the form stays open and editable and the
    /// server's message is available from [`FormSession::error`].
    pub async fn submit(&mut self) -> Result<(), SessionError> {
        let form = match (self.phase, &self.form) {
            (SessionPhase::Ready, Some(form)) => form,
            (phase, _) => {
                return Err(SessionError::InvalidPhase {
                    action: "submit",
                    phase: phase.as_str(),
                });
            }
        };
        if !form.can_submit() {
            return Err(SessionError::Incomplete(form.gate().pending().len()));
        }
        let responses = form.collect_responses();

        self.phase = SessionPhase::Submitting;
        self.error = None;
        let result = bounded(
            self.timeout,
            self.transport.submit_responses(&self.query, &responses),
        )
        .await;

        match result {
            Ok(()) => {
                tracing::info!("Submitted {} response(s)", responses.len());
                self.close();
                Ok(())
            }
            Err(err) => {
                tracing::error!("Submission failed: {}", err);
                self.error = Some(submission_message(&err));
                self.phase = SessionPhase::Ready;
                Err(err.into())
            }
        }
    }

    /// Discards the form. Allowed at any point outside an in-flight call.
    pub fn cancel(&mut self) {
        tracing::info!("Form cancelled in phase {}", self.phase);
        self.close();
    }

    fn close(&mut self) {
        self.form = None;
        self.last_values = None;
        self.phase = SessionPhase::Closed;
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn can_submit(&self) -> bool {
        self.phase == SessionPhase::Ready && self.form.as_ref().is_some_and(Form::can_submit)
    }

    /// Inline error for the operator, if the last fetch or submission failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn form(&self) -> Option<&Form> {
        self.form.as_ref()
    }

    /// The editable form. `None` unless the session is `Ready`.
    pub fn form_mut(&mut self) -> Option<&mut Form> {
        match self.phase {
            SessionPhase::Ready => self.form.as_mut(),
            _ => None,
        }
    }

    pub fn query(&self) -> &QueryContext {
        &self.query
    }

    /// Title shown for the form: the `template` query parameter.
    pub fn title(&self) -> Option<String> {
        self.query.template_name()
    }
}

/// A rejected submission shows the server's text verbatim; anything else is prefixed.
fn submission_message(err: &ClientError) -> String {
    match err {
        ClientError::SubmitRejected { body, .. } => body.clone(),
        other => format!("Failed to submit template: {}", other),
    }
}
