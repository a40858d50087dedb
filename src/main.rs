use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use folio_lib::contact::{comments_remaining, ContactForm, FormErrorLog};
use folio_lib::{
    AppState, Config, CrudController, DeleteOutcome, Notice, ProjectRecord, Source, Theme,
    ThemeCoordinator,
};

#[derive(Debug, Parser)]
#[command(name = "folio", about = "Manage and render portfolio project cards", version)]
struct Cli {
    /// Config file (defaults to FOLIO_CONFIG, then the platform config dir).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Directory holding the storage slots and logs.
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Remote document URL used by `load remote`.
    #[arg(long, global = true, value_name = "URL")]
    remote_url: Option<String>,
    /// Access key sent with remote requests.
    #[arg(long, global = true, value_name = "KEY")]
    access_key: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the stored projects.
    List {
        /// Print the management list as HTML.
        #[arg(long, conflicts_with = "json")]
        html: bool,
        /// Print the stored records as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Create a project.
    Add(RecordArgs),
    /// Update the project at POSITION; omitted fields keep their values.
    Edit {
        position: usize,
        #[command(flatten)]
        fields: RecordArgs,
    },
    /// Delete the project at POSITION after confirmation.
    Delete {
        position: usize,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Render the project gallery from one source.
    Load {
        #[arg(value_enum)]
        source: SourceArg,
        /// Write the page to FILE instead of stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Show or change the light/dark theme.
    #[command(subcommand)]
    Theme(ThemeCommand),
    /// Check contact form input.
    Contact {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        tel: String,
        #[arg(long, default_value = "")]
        comments: String,
        #[arg(long, default_value_t = 500)]
        max_comments: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SourceArg {
    Local,
    Remote,
}

impl From<SourceArg> for Source {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Local => Source::Local,
            SourceArg::Remote => Source::Remote,
        }
    }
}

#[derive(Debug, Subcommand)]
enum ThemeCommand {
    /// Print the stored theme.
    Show,
    /// Switch between light and dark.
    Toggle,
    /// Set the theme explicitly.
    Set { theme: Theme },
}

#[derive(Debug, Default, Args)]
struct RecordArgs {
    #[arg(long)]
    index: Option<String>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    image: Option<String>,
    #[arg(long)]
    image_alt: Option<String>,
    #[arg(long)]
    link: Option<String>,
    #[arg(long)]
    overview: Option<String>,
    /// Comma separated tags.
    #[arg(long)]
    tags: Option<String>,
}

impl RecordArgs {
    fn apply_to(self, mut record: ProjectRecord) -> ProjectRecord {
        let fields = [
            (self.index, &mut record.index),
            (self.title, &mut record.title),
            (self.description, &mut record.description),
            (self.image, &mut record.image),
            (self.image_alt, &mut record.image_alt),
            (self.link, &mut record.link),
            (self.overview, &mut record.overview),
            (self.tags, &mut record.tags),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        record
    }
}

fn main() {
    folio_lib::init_logging();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let mut config = Config::load(cli.config.as_deref()).context("load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(url) = cli.remote_url {
        config.remote.url = Some(url);
    }
    if let Some(key) = cli.access_key {
        config.remote.access_key = Some(key);
    }

    let state = AppState::open(config).context("open project storage")?;
    if let Err(err) = folio_lib::init_file_logging(&state.data_dir.join("logs")) {
        tracing::warn!(target: "folio", event = "file_logging_unavailable", error = %format!("{err:#}"));
    }
    tracing::debug!(target: "folio", event = "cli_started", data_dir = %state.data_dir.display());

    let code = match cli.command {
        Commands::List { html, json } => handle_list(&state, html, json),
        Commands::Add(fields) => handle_add(&state, fields),
        Commands::Edit { position, fields } => handle_edit(&state, position, fields),
        Commands::Delete { position, yes } => handle_delete(&state, position, yes),
        Commands::Load { source, out } => handle_load(&state, source.into(), out),
        Commands::Theme(command) => handle_theme(&state, command),
        Commands::Contact {
            name,
            email,
            tel,
            comments,
            max_comments,
        } => handle_contact(
            ContactForm {
                name,
                email,
                tel,
                comments,
            },
            max_comments,
        ),
    };
    folio_lib::flush_file_logs();
    code
}

fn open_controller(state: &AppState) -> (CrudController, i32) {
    let (controller, notice) = state.crud();
    let code = notice.map(|notice| report(&notice)).unwrap_or(0);
    (controller, code)
}

/// Print a notice and map it to an exit code.
fn report(notice: &Notice) -> i32 {
    if notice.is_error() {
        eprintln!("{notice}");
        1
    } else {
        println!("{notice}");
        0
    }
}

fn handle_list(state: &AppState, html: bool, json: bool) -> Result<i32> {
    let (controller, code) = open_controller(state);
    if json {
        let payload =
            serde_json::to_string_pretty(controller.records()).context("serialize projects")?;
        println!("{payload}");
    } else if html {
        println!("{}", controller.render_list());
    } else if controller.records().is_empty() {
        println!("No projects found in storage.");
    } else {
        for (position, record) in controller.records().iter().enumerate() {
            println!("{position}: [{}] {}", record.index, record.title);
        }
    }
    Ok(code)
}

fn handle_add(state: &AppState, fields: RecordArgs) -> Result<i32> {
    let (mut controller, _) = open_controller(state);
    let outcome = controller
        .submit(fields.apply_to(ProjectRecord::default()))
        .context("create project")?;
    Ok(report(&outcome.notice))
}

fn handle_edit(state: &AppState, position: usize, fields: RecordArgs) -> Result<i32> {
    let (mut controller, _) = open_controller(state);
    let (current, _) = controller
        .begin_edit(position)
        .with_context(|| format!("edit project at position {position}"))?;
    let outcome = controller
        .submit(fields.apply_to(current))
        .context("update project")?;
    Ok(report(&outcome.notice))
}

fn handle_delete(state: &AppState, position: usize, yes: bool) -> Result<i32> {
    let (mut controller, _) = open_controller(state);
    let mut ask = |prompt: &str| -> bool {
        if yes {
            return true;
        }
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    };
    let outcome = controller
        .delete(position, &mut ask)
        .with_context(|| format!("delete project at position {position}"))?;
    match outcome {
        DeleteOutcome::Declined => {
            println!("Delete cancelled.");
            Ok(0)
        }
        DeleteOutcome::Deleted { notice, .. } => Ok(report(&notice)),
    }
}

fn handle_load(state: &AppState, source: Source, out: Option<PathBuf>) -> Result<i32> {
    let page = state.gallery_page().context("prepare gallery")?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    runtime.block_on(page.load(source));

    let failed = matches!(page.gallery().state(), folio_lib::ViewState::Failed(_));
    let html = page.render();
    match out {
        Some(path) => std::fs::write(&path, html)
            .with_context(|| format!("write gallery to {}", path.display()))?,
        None => print!("{html}"),
    }
    Ok(if failed { 1 } else { 0 })
}

fn handle_theme(state: &AppState, command: ThemeCommand) -> Result<i32> {
    let mut theme = ThemeCoordinator::new(state.slots.clone());
    theme.init();
    let current = match command {
        ThemeCommand::Show => theme.current(),
        ThemeCommand::Toggle => theme.toggle(),
        ThemeCommand::Set { theme: next } => {
            theme.apply(next);
            next
        }
    };
    println!("{current}");
    Ok(0)
}

fn handle_contact(form: ContactForm, max_comments: usize) -> Result<i32> {
    let counter = comments_remaining(&form.comments, max_comments);
    println!("{}", counter.message());
    let mut log = FormErrorLog::default();
    let report = form
        .submit(max_comments, &mut log)
        .context("serialize form errors")?;
    println!("{}", report.output);
    Ok(if report.errors.is_empty() { 0 } else { 1 })
}
