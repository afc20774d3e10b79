mod client;
mod compact;
mod config;
mod describe;
mod format;
mod models;
mod output;
mod render;
mod schema;
mod table;

use crate::client::ApiClient;
use crate::config::{OutputSettings, Scope, save};
use crate::models::{ApiModel, Artifact, Project, Registry, Repository, SystemInfo, UserResp};
use crate::output::OutputOptions;
use crate::render::{OutputFormat, ResultSet};
use crate::schema::{DecodeRegistry, SchemaEnvelope, SchemaError};
use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "harborctl",
    version,
    about = "CLI for the Harbor container registry API"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "URL",
        help = "Harbor URL override for this invocation (otherwise read from config)"
    )]
    url: Option<String>,

    #[arg(long, global = true, help = "Username override for this invocation")]
    username: Option<String>,

    #[arg(long, global = true, help = "Secret/password override for this invocation")]
    secret: Option<String>,

    #[arg(
        long,
        short = 'o',
        value_enum,
        global = true,
        help = "Output format (defaults to the configured format)"
    )]
    output: Option<OutputFormat>,

    #[arg(
        long,
        global = true,
        help = "Use the compact table layout where one is defined"
    )]
    compact: bool,

    #[arg(
        long,
        global = true,
        help = "Include field descriptions in table output (ignored with --compact)"
    )]
    description: bool,

    #[arg(
        long,
        global = true,
        value_name = "N",
        help = "Table nesting depth; negative for unlimited, 0 for top level only"
    )]
    max_depth: Option<i64>,

    #[arg(
        long,
        global = true,
        value_name = "N",
        help = "JSON indentation width (0 for compact single-line output)"
    )]
    indent: Option<usize>,

    #[arg(
        long,
        global = true,
        value_name = "BOOL",
        help = "Sort JSON object keys alphabetically"
    )]
    sort_keys: Option<bool>,

    #[arg(
        long,
        global = true,
        help = "Print the API response as-is, skipping validation and table rendering"
    )]
    raw: bool,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "Write output to FILE instead of stdout"
    )]
    output_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Refuse to overwrite an existing output file")]
    no_overwrite: bool,

    #[arg(
        long,
        global = true,
        help = "Print to stdout in addition to the output file"
    )]
    with_stdout: bool,

    #[arg(long, global = true, help = "Pipe output through $PAGER")]
    pager: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project operations
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Repository operations
    #[command(subcommand)]
    Repo(RepoCommand),
    /// Artifact operations
    #[command(subcommand)]
    Artifact(ArtifactCommand),
    /// User operations
    #[command(subcommand)]
    User(UserCommand),
    /// Replication registry operations
    #[command(subcommand)]
    Registry(RegistryCommand),
    /// System-level information
    #[command(subcommand)]
    System(SystemCommand),
    /// Persist Harbor URL and credentials to the chosen scope
    Configure {
        #[arg(long, value_name = "URL")]
        url: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        secret: Option<String>,
        #[arg(
            long,
            value_enum,
            default_value_t = ScopeArg::User,
            help = "Where to write the config (local project dir or user config dir)"
        )]
        scope: ScopeArg,
    },
    /// Show current configuration (secrets masked)
    ConfigShow,
    /// Render a previously saved schema envelope file
    Print {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// List projects
    List {
        #[arg(long, value_name = "N")]
        page: Option<u32>,
        #[arg(long, value_name = "N")]
        page_size: Option<u32>,
    },
    /// Fetch a project by name or ID
    Get {
        #[arg(value_name = "NAME_OR_ID")]
        project: String,
    },
}

#[derive(Subcommand)]
enum RepoCommand {
    /// List repositories in a project
    List {
        #[arg(value_name = "PROJECT")]
        project: String,
        #[arg(long, value_name = "N")]
        page: Option<u32>,
        #[arg(long, value_name = "N")]
        page_size: Option<u32>,
    },
}

#[derive(Subcommand)]
enum ArtifactCommand {
    /// List artifacts in a repository
    List {
        #[arg(value_name = "PROJECT")]
        project: String,
        #[arg(value_name = "REPOSITORY")]
        repository: String,
        #[arg(long, value_name = "N")]
        page: Option<u32>,
        #[arg(long, value_name = "N")]
        page_size: Option<u32>,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    /// List users
    List,
    /// Fetch a user by ID
    Get {
        #[arg(value_name = "USER_ID")]
        id: i64,
    },
}

#[derive(Subcommand)]
enum RegistryCommand {
    /// List replication registries
    List,
    /// Fetch a registry by ID
    Get {
        #[arg(value_name = "REGISTRY_ID")]
        id: i64,
    },
}

#[derive(Subcommand)]
enum SystemCommand {
    /// Show general system information (raw JSON)
    Info,
    /// Show storage volume usage
    Volumes,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScopeArg {
    Local,
    User,
}

impl From<ScopeArg> for Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Local => Scope::Local,
            ScopeArg::User => Scope::User,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("reading current directory")?;

    match &cli.command {
        Commands::Configure {
            url,
            username,
            secret,
            scope,
        } => {
            let mut existing = config::load_scope((*scope).into(), &cwd)?;
            if let Some(url) = url {
                existing.url = Some(url.clone());
            }
            if let Some(username) = username {
                existing.username = Some(username.clone());
            }
            if let Some(secret) = secret {
                existing.secret = Some(secret.clone());
            }
            let path = save((*scope).into(), &existing, &cwd)?;
            println!("Saved configuration to {}", path.display());
            return Ok(());
        }
        Commands::ConfigShow => {
            let mut masked = config::load(&cwd)?;
            if masked.secret.is_some() {
                masked.secret = Some("*****".into());
            }
            print!("{}", serde_yaml::to_string(&masked)?);
            return Ok(());
        }
        Commands::Print { file } => {
            let merged = config::load(&cwd)?;
            let settings = output_settings(merged.output.unwrap_or_default(), &cli);
            let dest = dest_options(&cli);
            let text = print_envelope(file, &settings)?;
            output::write_output(&text, &dest)?;
            return Ok(());
        }
        Commands::Completion { shell } => {
            use clap_complete::{generate, shells};
            let mut cmd = Cli::command();
            let bin = cmd.get_name().to_string();
            match shell {
                CompletionShell::Bash => {
                    generate(shells::Bash, &mut cmd, bin, &mut std::io::stdout())
                }
                CompletionShell::Zsh => {
                    generate(shells::Zsh, &mut cmd, bin, &mut std::io::stdout())
                }
                CompletionShell::Fish => {
                    generate(shells::Fish, &mut cmd, bin, &mut std::io::stdout())
                }
                CompletionShell::PowerShell => {
                    generate(shells::PowerShell, &mut cmd, bin, &mut std::io::stdout())
                }
            }
            return Ok(());
        }
        _ => {}
    }

    let effective = config::resolve(
        &cwd,
        cli.url.clone(),
        cli.username.clone(),
        cli.secret.clone(),
    )?;
    let client = ApiClient::new(&effective.url, &effective.username, &effective.secret)?;
    let settings = output_settings(effective.output, &cli);
    let dest = dest_options(&cli);

    match &cli.command {
        Commands::Project(command) => match command {
            ProjectCommand::List { page, page_size } => run_list::<Project>(
                &client,
                "/projects",
                page_query(*page, *page_size),
                cli.raw,
                &settings,
                &dest,
            )?,
            ProjectCommand::Get { project } => run_one::<Project>(
                &client,
                &format!("/projects/{project}"),
                vec![],
                cli.raw,
                &settings,
                &dest,
            )?,
        },
        Commands::Repo(command) => match command {
            RepoCommand::List {
                project,
                page,
                page_size,
            } => run_list::<Repository>(
                &client,
                &format!("/projects/{project}/repositories"),
                page_query(*page, *page_size),
                cli.raw,
                &settings,
                &dest,
            )?,
        },
        Commands::Artifact(command) => match command {
            ArtifactCommand::List {
                project,
                repository,
                page,
                page_size,
            } => {
                let mut query = page_query(*page, *page_size);
                query.push(("with_tag", "true".into()));
                run_list::<Artifact>(
                    &client,
                    &format!(
                        "/projects/{project}/repositories/{}/artifacts",
                        encode_repository(repository)
                    ),
                    query,
                    cli.raw,
                    &settings,
                    &dest,
                )?
            }
        },
        Commands::User(command) => match command {
            UserCommand::List => {
                run_list::<UserResp>(&client, "/users", vec![], cli.raw, &settings, &dest)?
            }
            UserCommand::Get { id } => run_one::<UserResp>(
                &client,
                &format!("/users/{id}"),
                vec![],
                cli.raw,
                &settings,
                &dest,
            )?,
        },
        Commands::Registry(command) => match command {
            RegistryCommand::List => {
                run_list::<Registry>(&client, "/registries", vec![], cli.raw, &settings, &dest)?
            }
            RegistryCommand::Get { id } => run_one::<Registry>(
                &client,
                &format!("/registries/{id}"),
                vec![],
                cli.raw,
                &settings,
                &dest,
            )?,
        },
        Commands::System(command) => match command {
            // /systeminfo has no stable shape across Harbor versions, so it
            // is always rendered as raw JSON.
            SystemCommand::Info => run_raw(&client, "/systeminfo", vec![], &settings, &dest)?,
            SystemCommand::Volumes => run_one::<SystemInfo>(
                &client,
                "/systeminfo/volumes",
                vec![],
                cli.raw,
                &settings,
                &dest,
            )?,
        },
        Commands::Configure { .. }
        | Commands::ConfigShow
        | Commands::Print { .. }
        | Commands::Completion { .. } => unreachable!("handled earlier"),
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("HARBORCTL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn output_settings(base: OutputSettings, cli: &Cli) -> OutputSettings {
    let mut settings = base;
    if let Some(format) = cli.output {
        settings.format = format;
    }
    if cli.compact {
        settings.table.compact = true;
    }
    if cli.description {
        settings.table.description = true;
    }
    if let Some(depth) = cli.max_depth {
        settings.table.max_depth = depth;
    }
    if let Some(indent) = cli.indent {
        settings.json.indent = indent;
    }
    if let Some(sort) = cli.sort_keys {
        settings.json.sort_keys = sort;
    }
    settings
}

fn dest_options(cli: &Cli) -> OutputOptions {
    OutputOptions {
        file: cli.output_file.clone(),
        no_overwrite: cli.no_overwrite,
        with_stdout: cli.with_stdout,
        pager: cli.pager,
    }
}

fn page_query(page: Option<u32>, page_size: Option<u32>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(page) = page {
        query.push(("page", page.to_string()));
    }
    if let Some(size) = page_size {
        query.push(("page_size", size.to_string()));
    }
    query
}

/// Repository names may contain slashes; Harbor expects them double-encoded
/// in URL paths.
fn encode_repository(name: &str) -> String {
    name.replace('/', "%252F")
}

fn run_list<T>(
    client: &ApiClient,
    path: &str,
    query: Vec<(&str, String)>,
    raw: bool,
    settings: &OutputSettings,
    dest: &OutputOptions,
) -> Result<()>
where
    T: ApiModel + Serialize + DeserializeOwned + Default,
{
    if raw {
        return run_raw(client, path, query, settings, dest);
    }
    let items: Vec<T> = client.get_list(path, &query)?;
    render::render_result(&ResultSet::Multiple(items), settings, dest)
}

fn run_one<T>(
    client: &ApiClient,
    path: &str,
    query: Vec<(&str, String)>,
    raw: bool,
    settings: &OutputSettings,
    dest: &OutputOptions,
) -> Result<()>
where
    T: ApiModel + Serialize + DeserializeOwned + Default,
{
    if raw {
        return run_raw(client, path, query, settings, dest);
    }
    let item: T = client.get_one(path, &query)?;
    render::render_result(&ResultSet::Single(item), settings, dest)
}

fn run_raw(
    client: &ApiClient,
    path: &str,
    query: Vec<(&str, String)>,
    settings: &OutputSettings,
    dest: &OutputOptions,
) -> Result<()> {
    let response = client.get(path, &query)?;
    let value = response
        .json
        .ok_or_else(|| anyhow!("response from `{path}` is not JSON"))?;
    let text = render::format_raw(&value, settings)?;
    output::write_output(&text, dest)?;
    Ok(())
}

/// Decode a saved schema envelope and re-render it with the current output
/// settings. Envelopes with an unknown type or incompatible version fall
/// back to printing their data payload as raw JSON; files that are not
/// envelopes at all are printed as raw JSON wholesale.
fn print_envelope(file: &Path, settings: &OutputSettings) -> Result<String> {
    match SchemaEnvelope::from_file(file) {
        Ok(envelope) => match DecodeRegistry::global().decode(&envelope) {
            Ok(decoded) => render::format_decoded(&decoded, &envelope.data, settings),
            Err(e) => {
                warn!("cannot decode {}: {e}; printing data as-is", file.display());
                render::format_raw(&envelope.data, settings)
            }
        },
        Err(e @ SchemaError::Read { .. }) => Err(e.into()),
        Err(e) => {
            warn!(
                "{} is not a schema envelope ({e}); printing as raw JSON",
                file.display()
            );
            let contents = fs::read_to_string(file)
                .with_context(|| format!("reading {}", file.display()))?;
            let value: serde_json::Value = serde_json::from_str(&contents)
                .with_context(|| format!("parsing {} as JSON", file.display()))?;
            render::format_raw(&value, settings)
        }
    }
}
