//! Common test utilities: template fixtures and an in-memory transport.
use async_trait::async_trait;
use formsync::prelude::{
    ClientError, ControlId, Form, FormResponses, FormTransport, QueryContext, Renderer, parse,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One Ask prompt echoed by two Var references, one in the header and one in the body.
#[allow(dead_code)]
pub const SCENARIO_A: &str =
    "Def: CALL=<Your callsign>\n<Ask CALL>\nTo: <Var CALL>@example\nMsg:\nHello <Var CALL>";

/// A single select prompt and nothing else.
#[allow(dead_code)]
pub const SCENARIO_B: &str = "<Select URGENCY:Routine=R,Priority=P,Emergency=E>";

/// A realistic ICS-213 style template exercising every directive.
#[allow(dead_code)]
pub const GENERAL_MESSAGE: &str = "\
Def: MYCALL=<Ask Your callsign,UP>
Def: BROKEN LINE WITHOUT ASSIGNMENT
Type: Private
Subj: ICS-213 from <Var MYCALL>
To: <Ask Recipient,UP>
Msg:
Incident: <Ask Incident name>
Priority: <Select PRIORITY:Routine=R,Priority=P,Immediate=I>
Message:
<Ask Message,MU>

Sent by <Var MYCALL>
";

#[allow(dead_code)]
pub fn render(template: &str) -> Form {
    Renderer::default().render(parse(template))
}

/// Id of the first control bound to `name`.
#[allow(dead_code)]
pub fn first_control(form: &Form, name: &str) -> ControlId {
    form.controls_named(name)
        .next()
        .map(|c| c.id)
        .unwrap_or_else(|| panic!("no control bound to '{}'", name))
}

/// Values currently shown by every control bound to `name`.
#[allow(dead_code)]
pub fn values_of(form: &Form, name: &str) -> Vec<String> {
    form.controls_named(name)
        .map(|c| c.value().to_string())
        .collect()
}

/// Submissions recorded by a [`MockTransport`].
#[allow(dead_code)]
pub type Submissions = Arc<Mutex<Vec<(String, FormResponses)>>>;

/// Serves queued fetch results (the last one repeats) and records submissions.
#[allow(dead_code)]
pub struct MockTransport {
    fetches: Mutex<VecDeque<Result<String, ClientError>>>,
    submit_result: Result<(), ClientError>,
    fetch_delay: Option<Duration>,
    pub submissions: Submissions,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn serving(template: &str) -> Self {
        Self::with_fetches(vec![Ok(template.to_string())])
    }

    pub fn failing() -> Self {
        Self::with_fetches(vec![Err(ClientError::FetchRejected {
            status: "404 Not Found".to_string(),
        })])
    }

    pub fn with_fetches(fetches: Vec<Result<String, ClientError>>) -> Self {
        Self {
            fetches: Mutex::new(fetches.into()),
            submit_result: Ok(()),
            fetch_delay: None,
            submissions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn rejecting_submit(self, status: u16, body: &str) -> Self {
        self.failing_submit(ClientError::SubmitRejected {
            status,
            body: body.to_string(),
        })
    }

    pub fn failing_submit(mut self, err: ClientError) -> Self {
        self.submit_result = Err(err);
        self
    }

    pub fn delaying_fetch(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }
}

#[async_trait]
impl FormTransport for MockTransport {
    async fn fetch_template(&self, _query: &QueryContext) -> Result<String, ClientError> {
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        let mut fetches = self.fetches.lock().unwrap();
        if fetches.len() > 1 {
            fetches.pop_front().unwrap()
        } else {
            fetches.front().cloned().unwrap()
        }
    }

    async fn submit_responses(
        &self,
        query: &QueryContext,
        responses: &FormResponses,
    ) -> Result<(), ClientError> {
        self.submissions
            .lock()
            .unwrap()
            .push((query.as_str().to_string(), responses.clone()));
        self.submit_result.clone()
    }
}
