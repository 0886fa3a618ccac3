//! CLI surface for grove.
//!
//! Goal:
//! - Thin handlers over the forest operations
//! - Tolerant parsing (aliases, boolish flags, case/dash tolerance)
//! - Document on stdout, telemetry on stderr

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, builder::BoolishValueParser};
use serde_json::Value;
use thiserror::Error;

use crate::config::{self, Config};
use crate::core::{EntryId, Forest, Placement, RawEntry};
use crate::telemetry::LogFormat;
use crate::Result;

mod commands;
mod render;

// =============================================================================
// Entry + global options
// =============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "grove",
    version,
    about = "Edit ordered trees of entries stored as JSON documents",
    infer_subcommands = true,
    infer_long_args = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Machine-readable JSON output (default: false; use `--json` for scripting).
    #[arg(
        long,
        global = true,
        default_value_t = false,
        num_args = 0..=1,
        value_parser = BoolishValueParser::new()
    )]
    pub json: bool,

    /// Document to operate on.
    #[arg(
        short = 'f',
        long,
        global = true,
        value_name = "PATH",
        default_value = "grove.json"
    )]
    pub file: PathBuf,

    /// Config file path (default: the XDG config location).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Errors only.
    #[arg(
        short = 'q',
        long,
        global = true,
        default_value_t = false,
        num_args = 0..=1,
        value_parser = BoolishValueParser::new()
    )]
    pub quiet: bool,

    /// Debug output (repeat for more).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Shape of the stderr log stream.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective verbosity for the telemetry filter.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            1u8.saturating_add(self.verbose)
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the document tree (or one subtree).
    #[command(alias = "tree")]
    Show(ShowArgs),

    /// Add a new entry.
    #[command(alias = "new")]
    Add(AddArgs),

    /// Merge changes into an entry.
    #[command(alias = "edit")]
    Update(UpdateArgs),

    /// Remove entries (with their subtrees).
    #[command(alias = "rm", alias = "delete")]
    Remove(RemoveArgs),

    /// Swap an entry for a freshly built one, same position.
    Replace(ReplaceArgs),

    /// Move an entry (with its subtree) somewhere else.
    #[command(alias = "mv")]
    Move(MoveArgs),
}

// =============================================================================
// Per-command args
// =============================================================================

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Entry to show (whole document when omitted).
    #[arg(value_name = "ID", required = false)]
    pub id: Option<String>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Label (positional).
    #[arg(value_name = "LABEL", required = false)]
    pub label: Option<String>,

    /// Explicit entry id (minted when omitted).
    #[arg(long)]
    pub id: Option<String>,

    /// Create as an empty group instead of a leaf.
    #[arg(long)]
    pub group: bool,

    /// Payload field, repeatable. The value parses as JSON when it can.
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,

    /// Parent group to insert into (root when omitted).
    #[arg(long, value_name = "ID")]
    pub parent: Option<String>,

    /// Insert before this sibling.
    #[arg(long, value_name = "ID", conflicts_with_all = ["after", "parent", "front"])]
    pub before: Option<String>,

    /// Insert after this sibling.
    #[arg(long, value_name = "ID", conflicts_with_all = ["parent", "front"])]
    pub after: Option<String>,

    /// Insert at the front of the run instead of the back.
    #[arg(long)]
    pub front: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: String,

    /// New label.
    #[arg(short = 'l', long)]
    pub label: Option<String>,

    /// Payload field to merge, repeatable.
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,

    /// Turn the entry into a leaf, dropping its subtree.
    #[arg(long, conflicts_with = "group")]
    pub leaf: bool,

    /// Turn a leaf into an empty group.
    #[arg(long)]
    pub group: bool,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// One or more entry ids to remove.
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ReplaceArgs {
    pub id: String,

    /// Label for the replacement.
    #[arg(short = 'l', long)]
    pub label: Option<String>,

    /// Id for the replacement (minted when omitted).
    #[arg(long = "new-id", value_name = "ID")]
    pub new_id: Option<String>,

    /// Build the replacement as an empty group instead of a leaf.
    #[arg(long)]
    pub group: bool,

    /// Payload field, repeatable.
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    pub id: String,

    /// Destination group (root when omitted).
    #[arg(long, value_name = "ID")]
    pub parent: Option<String>,

    /// Move before this sibling.
    #[arg(long, value_name = "ID", conflicts_with_all = ["after", "parent", "front"])]
    pub before: Option<String>,

    /// Move after this sibling.
    #[arg(long, value_name = "ID", conflicts_with_all = ["parent", "front"])]
    pub after: Option<String>,

    /// Move to the front of the run instead of the back.
    #[arg(long)]
    pub front: bool,
}

// =============================================================================
// Errors
// =============================================================================

/// Document handling failures surfaced by the CLI.
///
/// The forest itself never fails on a missing target; the CLI resolves
/// ids up front so a typo is an error here instead of a silent no-op.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to render document: {0}")]
    Render(serde_json::Error),

    #[error("failed to write `{path}`: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no entry with id `{0}`")]
    UnknownId(EntryId),

    #[error("an entry with id `{0}` already exists")]
    DuplicateId(EntryId),

    #[error("`{0}` cannot be moved relative to its own subtree")]
    MoveIntoSelf(EntryId),

    #[error("document has {count} entries, limit is {limit}")]
    TooManyEntries { count: usize, limit: usize },

    #[error("document nests {depth} levels deep, limit is {limit}")]
    TooDeep { depth: usize, limit: usize },
}

// =============================================================================
// Public API
// =============================================================================

/// Parse CLI from raw args, normalizing flag spelling first.
pub fn parse_from<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let raw: Vec<OsString> = args.into_iter().map(|t| t.into()).collect();
    Cli::parse_from(normalize_args(raw))
}

/// Run the CLI (used by bin).
pub fn run(cli: Cli) -> Result<()> {
    let config = config::load_or_init(cli.config.as_deref());
    let ctx = Ctx {
        file: cli.file,
        json: cli.json,
        config,
    };

    match cli.command {
        Commands::Show(args) => commands::show::handle(&ctx, args),
        Commands::Add(args) => commands::add::handle(&ctx, args),
        Commands::Update(args) => commands::update::handle(&ctx, args),
        Commands::Remove(args) => commands::remove::handle(&ctx, args),
        Commands::Replace(args) => commands::replace::handle(&ctx, args),
        Commands::Move(args) => commands::mv::handle(&ctx, args),
    }
}

// =============================================================================
// Context + helpers
// =============================================================================

#[derive(Debug)]
pub(crate) struct Ctx {
    file: PathBuf,
    json: bool,
    config: Config,
}

/// Load the document into a forest, enforcing the configured limits.
///
/// A missing file is an empty document, so the first `add` can
/// bootstrap one.
fn load_forest(ctx: &Ctx) -> Result<Forest> {
    let mut forest = Forest::with_random_ids();
    if !ctx.file.exists() {
        tracing::debug!(path = %ctx.file.display(), "document missing, starting empty");
        return Ok(forest);
    }

    let contents = fs::read_to_string(&ctx.file).map_err(|source| DocumentError::Read {
        path: ctx.file.clone(),
        source,
    })?;
    let sources: Vec<RawEntry> =
        serde_json::from_str(&contents).map_err(|source| DocumentError::Parse {
            path: ctx.file.clone(),
            source,
        })?;
    forest.create(sources);

    let limits = &ctx.config.limits;
    let count = forest.entry_count();
    if count > limits.max_entries {
        return Err(DocumentError::TooManyEntries {
            count,
            limit: limits.max_entries,
        }
        .into());
    }
    let depth = forest.max_depth();
    if depth > limits.max_depth {
        return Err(DocumentError::TooDeep {
            depth,
            limit: limits.max_depth,
        }
        .into());
    }
    Ok(forest)
}

fn save_forest(ctx: &Ctx, forest: &Forest) -> Result<()> {
    let mut contents =
        serde_json::to_string_pretty(&forest.snapshot()).map_err(DocumentError::Render)?;
    contents.push('\n');
    atomic_write(&ctx.file, contents.as_bytes())?;
    Ok(())
}

fn atomic_write(path: &Path, data: &[u8]) -> std::result::Result<(), DocumentError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let temp = tempfile::NamedTempFile::new_in(&dir).map_err(|source| DocumentError::Write {
        path: dir.clone(),
        source,
    })?;
    fs::write(temp.path(), data).map_err(|source| DocumentError::Write {
        path: temp.path().to_path_buf(),
        source,
    })?;
    temp.persist(path).map_err(|e| DocumentError::Write {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Parse an id and require it to be present in the forest.
fn resolve_id(forest: &Forest, raw: &str) -> Result<EntryId> {
    let id = EntryId::new(raw)?;
    if !forest.contains(&id) {
        return Err(DocumentError::UnknownId(id).into());
    }
    Ok(id)
}

/// Where an insertion should land, resolved against the forest.
enum PlacementSpec {
    Beside(EntryId, Placement),
    Within { parent: Option<EntryId>, front: bool },
}

fn resolve_placement(
    forest: &Forest,
    parent: Option<&str>,
    before: Option<&str>,
    after: Option<&str>,
    front: bool,
) -> Result<PlacementSpec> {
    if let Some(sibling) = before {
        let sibling = resolve_id(forest, sibling)?;
        return Ok(PlacementSpec::Beside(sibling, Placement::Before));
    }
    if let Some(sibling) = after {
        let sibling = resolve_id(forest, sibling)?;
        return Ok(PlacementSpec::Beside(sibling, Placement::After));
    }
    let parent = parent.map(|raw| resolve_id(forest, raw)).transpose()?;
    Ok(PlacementSpec::Within { parent, front })
}

fn insert_with(forest: &mut Forest, spec: &PlacementSpec, source: RawEntry) -> Option<EntryId> {
    match spec {
        PlacementSpec::Beside(sibling, placement) => {
            forest.insert_at(sibling, source, *placement)
        }
        PlacementSpec::Within { parent, front: true } => {
            forest.prepend_at(parent.as_ref(), source)
        }
        PlacementSpec::Within {
            parent,
            front: false,
        } => forest.append_at(parent.as_ref(), source),
    }
}

fn print_line(s: &str) -> Result<()> {
    use std::io::Write;
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{s}")
        && e.kind() != std::io::ErrorKind::BrokenPipe
    {
        return Err(DocumentError::Write {
            path: PathBuf::from("<stdout>"),
            source: e,
        }
        .into());
    }
    Ok(())
}

/// Print the whole document as JSON (`--json` output for mutators).
fn print_document(forest: &Forest) -> Result<()> {
    let s = serde_json::to_string_pretty(&forest.snapshot()).map_err(DocumentError::Render)?;
    print_line(&s)
}

// =============================================================================
// Parsing helpers
// =============================================================================

fn normalize_args(mut raw: Vec<OsString>) -> Vec<OsString> {
    if raw.is_empty() {
        return raw;
    }

    let mut out = Vec::with_capacity(raw.len());
    out.push(raw.remove(0)); // program name

    for arg in raw {
        let s = arg.to_string_lossy();
        if s.starts_with("--") {
            let mut pieces = s.splitn(2, '=');
            let flag = pieces.next().unwrap_or("");
            let val = pieces.next();
            let mut canon = flag.to_lowercase().replace('_', "-");
            canon = canonical_flag(&canon).to_string();
            if let Some(v) = val {
                out.push(OsString::from(format!("{canon}={v}")));
            } else {
                out.push(OsString::from(canon));
            }
        } else {
            out.push(arg);
        }
    }
    out
}

fn canonical_flag(flag: &str) -> &str {
    match flag {
        "--fields" => "--field",
        "--parent-id" => "--parent",
        "--prepend" => "--front",
        "--document" | "--doc" => "--file",
        other => other,
    }
}

/// `KEY=VALUE` payload field. The value is parsed as JSON when it is
/// valid JSON, else taken as a string.
fn parse_field(raw: &str) -> std::result::Result<(String, Value), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("expected KEY=VALUE, got `{raw}`"));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
