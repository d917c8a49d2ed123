use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use scraper::Html;
use tracing::{debug, info};
use url::Url;

use cortex_forms::config::SessionConfig;
use cortex_forms::recording::RecordingSession;
use cortex_forms::serialize::{self, FormSummary};
use cortex_forms::session::HttpSession;
use cortex_forms::{dom, Browsable, Form};

#[derive(Parser)]
#[command(name = "cortex-forms")]
#[command(about = "Inspect, fill in and submit HTML forms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// HTML file path, URL (http/https), or '-' for stdin
    input: String,

    /// CSS selector of the form
    #[arg(short, long, default_value = "form")]
    selector: String,

    /// Document URL for file or stdin input, used to resolve relative actions
    #[arg(long)]
    base_url: Option<String>,

    /// Override the configured User-Agent
    #[arg(long)]
    user_agent: Option<String>,

    /// Override the configured request timeout
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a form's fields and buttons
    Inspect {
        #[command(flatten)]
        source: Source,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Fill in a form and submit it
    Submit {
        #[command(flatten)]
        source: Source,

        /// Set a field to a single value
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Set a multi-valued field such as a checkbox group
        #[arg(long = "values", value_name = "NAME=V1,V2")]
        values: Vec<String>,

        /// Remove a field's values from the submission
        #[arg(long = "delete", value_name = "NAME")]
        delete: Vec<String>,

        /// Submit button to click (defaults to the first one)
        #[arg(long)]
        click: Option<String>,

        /// Print the request as JSON instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
}

struct Edits {
    set: Vec<String>,
    values: Vec<String>,
    delete: Vec<String>,
    click: Option<String>,
}

struct LoadedPage {
    html: String,
    url: Url,
    session: Option<HttpSession>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { source, format } => {
            info!(input = %source.input, selector = %source.selector, "inspect command");
            run_inspect(&source, &format)
        }
        Commands::Submit {
            source,
            set,
            values,
            delete,
            click,
            dry_run,
        } => {
            info!(input = %source.input, selector = %source.selector, dry_run = dry_run, "submit command");
            let edits = Edits {
                set,
                values,
                delete,
                click,
            };
            run_submit(&source, &edits, dry_run)
        }
    }
}

fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

fn load_config(source: &Source) -> Result<SessionConfig> {
    Ok(SessionConfig::load()?.with_overrides(source.user_agent.clone(), source.timeout_secs))
}

fn load_page(source: &Source, config: &SessionConfig) -> Result<LoadedPage> {
    if is_url(&source.input) {
        let session = HttpSession::new(config)?;
        session.open(&source.input)?;
        return Ok(LoadedPage {
            html: session.body(),
            url: session.url(),
            session: Some(session),
        });
    }

    let html = if source.input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&source.input)
            .with_context(|| format!("Failed to read {}", source.input))?
    };

    let url = match &source.base_url {
        Some(base) => Url::parse(base).with_context(|| format!("Invalid base URL '{base}'"))?,
        None if source.input != "-" => file_url(Path::new(&source.input))?,
        None => Url::parse("about:blank")?,
    };
    debug!(html_len = html.len(), url = %url, "loaded page");
    Ok(LoadedPage {
        html,
        url,
        session: None,
    })
}

fn file_url(path: &Path) -> Result<Url> {
    let absolute = std::fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    Url::from_file_path(&absolute)
        .map_err(|_| anyhow::anyhow!("Cannot build a file URL for {}", absolute.display()))
}

fn run_inspect(source: &Source, format: &str) -> Result<()> {
    let config = load_config(source)?;
    let page = load_page(source, &config)?;
    let document = Html::parse_document(&page.html);
    let node = dom::find_form(&document, &source.selector)?;

    // Inspection never dispatches, so a recorder is enough to resolve URLs.
    let resolver = RecordingSession::new(page.url);
    let form = Form::new(&resolver, node);
    let summary = FormSummary::from(&form);

    let output = match format {
        "json" => serde_json::to_string_pretty(&summary)?,
        _ => serialize::to_compact_text(&summary),
    };
    println!("{output}");
    Ok(())
}

fn run_submit(source: &Source, edits: &Edits, dry_run: bool) -> Result<()> {
    let config = load_config(source)?;
    let page = load_page(source, &config)?;
    let document = Html::parse_document(&page.html);

    if dry_run {
        let recorder = RecordingSession::new(page.url);
        fill_and_send(&recorder, &document, &source.selector, edits)?;
        println!("{}", recorder.to_json()?);
        return Ok(());
    }

    let session = match page.session {
        Some(session) => session,
        None => {
            let session = HttpSession::new(&config)?;
            session.set_page(page.url, page.html);
            session
        }
    };
    fill_and_send(&session, &document, &source.selector, edits)?;
    info!(url = %session.url(), status = session.status(), "form submitted");
    println!("{}", session.body());
    Ok(())
}

fn fill_and_send<B: Browsable>(
    session: &B,
    document: &Html,
    selector: &str,
    edits: &Edits,
) -> Result<()> {
    let node = dom::find_form(document, selector)?;
    let mut form = Form::new(session, node);

    for pair in &edits.set {
        let (name, value) = split_assignment(pair)?;
        form.input(name, value)?;
    }
    for pair in &edits.values {
        let (name, list) = split_assignment(pair)?;
        let values: Vec<&str> = if list.is_empty() {
            Vec::new()
        } else {
            list.split(',').collect()
        };
        form.input_slice(name, &values)?;
    }
    for name in &edits.delete {
        form.delete_field(name)?;
    }

    match &edits.click {
        Some(button) => form.click(button)?,
        None => form.submit()?,
    }
    Ok(())
}

fn split_assignment(pair: &str) -> Result<(&str, &str)> {
    pair.split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected NAME=VALUE, got '{pair}'"))
}
