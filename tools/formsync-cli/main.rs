use async_trait::async_trait;
use clap::Parser;
use formsync::prelude::*;
use itertools::Itertools;
use std::fs;
use std::io::{self, Write};

/// Reads the template from a local file; "submitting" prints the body instead of posting it.
struct FileTransport {
    path: String,
}

#[async_trait]
impl FormTransport for FileTransport {
    async fn fetch_template(&self, _query: &QueryContext) -> std::result::Result<String, ClientError> {
        fs::read_to_string(&self.path)
            .map_err(|e| ClientError::Transport(format!("Could not read '{}': {}", self.path, e)))
    }

    async fn submit_responses(
        &self,
        _query: &QueryContext,
        responses: &FormResponses,
    ) -> std::result::Result<(), ClientError> {
        let json = serde_json::to_string_pretty(responses)
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        println!("{}", json);
        Ok(())
    }
}

/// Render, fill and submit message templates
#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a local template file. Omit to fetch from the server with --query
    template_path: Option<String>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Server base URL, overriding the configuration
    #[arg(long)]
    server: Option<String>,

    /// Query string forwarded to the template and submission endpoints
    #[arg(short, long, default_value = "")]
    query: String,

    /// Answer a variable: NAME=VALUE (repeatable)
    #[arg(short, long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,

    /// Print the rendered header and body markup
    #[arg(long)]
    markup: bool,

    /// Submit the responses once every prompt is answered
    #[arg(long)]
    submit: bool,

    /// Run in interactive mode to be prompted for every answer
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => FormConfig::from_file(path).unwrap_or_else(|e| exit_with_error(&e.to_string())),
        None => FormConfig::default(),
    };
    if let Some(server) = &cli.server {
        config.base_url = server.clone();
    }
    let query = QueryContext::from_raw(&cli.query);

    match cli.template_path.clone() {
        Some(path) => {
            let session = FormSession::open(FileTransport { path }, query, &config).await;
            run(session, &cli).await;
        }
        None => {
            if query.is_empty() {
                exit_with_error("Either a template path or --query is required.");
            }
            let transport = HttpTransport::new(&config)
                .unwrap_or_else(|e| exit_with_error(&format!("Could not create client: {}", e)));
            let session = FormSession::open(transport, query, &config).await;
            run(session, &cli).await;
        }
    }
}

async fn run<T: FormTransport>(mut session: FormSession<T>, cli: &Cli) {
    if let Some(message) = session.error() {
        exit_with_error(message);
    }
    if let Some(title) = session.title() {
        println!("--- {} ---", title);
    }

    let Some(form) = session.form_mut() else {
        exit_with_error("The form is not available.");
    };

    for diagnostic in form.diagnostics() {
        eprintln!("warning: {}", diagnostic);
    }

    for assignment in &cli.set {
        let (name, value) = assignment
            .split_once('=')
            .unwrap_or_else(|| exit_with_error(&format!("Expected NAME=VALUE, got '{}'", assignment)));
        if let Err(e) = form.fill(name.trim(), value) {
            exit_with_error(&e.to_string());
        }
    }

    if cli.human {
        run_interactive(form);
    }

    println!("\n{}", form.preview());

    if cli.markup {
        let markup = form.markup();
        println!("\n--- Header Markup ---\n{}", markup.header_markup);
        println!("\n--- Body Markup ---\n{}", markup.body_markup);
    }

    let pending = form.gate().pending().len();
    if pending > 0 {
        println!("\n{} prompt(s) still unanswered.", pending);
    }

    if !cli.submit {
        let responses = form.collect_responses();
        let json = serde_json::to_string_pretty(&responses)
            .unwrap_or_else(|e| exit_with_error(&format!("Could not encode responses: {}", e)));
        println!("\n{}", json);
        return;
    }

    match session.submit().await {
        Ok(()) => println!("\nMessage posted to outbox successfully"),
        Err(e) => exit_with_error(session.error().unwrap_or(&e.to_string())),
    }
}

/// Prompts once per variable, at its first occurrence.
fn run_interactive(form: &mut Form) {
    println!("--- formsync Interactive Mode ---");

    let prompts: Vec<Control> = form
        .controls()
        .iter()
        .unique_by(|c| c.name.clone())
        .cloned()
        .collect();

    for control in prompts {
        let current = form
            .control(control.id)
            .map(|c| c.value().to_string())
            .unwrap_or_default();

        let answer = match control.kind {
            ControlKind::Choice => loop {
                println!("\nChoose {}:", control.name);
                for (index, option) in control.options.iter().enumerate() {
                    println!("  {}: {}", index + 1, option.label);
                }
                let choice = prompt_for_input("Enter choice", None);
                if choice.is_empty() {
                    break current.clone();
                }
                match choice.parse::<usize>().ok().and_then(|i| control.options.get(i.wrapping_sub(1))) {
                    Some(option) => break option.value.clone(),
                    None => println!("Invalid choice. Enter 1-{}.", control.options.len()),
                }
            },
            ControlKind::Text | ControlKind::TextArea => {
                let default = (!current.is_empty()).then_some(current.as_str());
                prompt_for_input(&control.placeholder, default)
            }
        };

        if let Err(e) = form.input(control.id, &answer) {
            eprintln!("Could not set '{}': {}", control.name, e);
        }
    }
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    if io::stdout().flush().is_err() || io::stdin().read_line(&mut line).is_err() {
        exit_with_error("Failed to read from the terminal.");
    }
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
