use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};

use doctree::commands::{self, Context, ReorganizeRequest};
use doctree::format::OutputFormat;
use doctree::telemetry::{self, LogFormat};

/// Regroup documentation by workspace package
///
/// Takes the flat forest a documentation generator produced for a
/// multi-package workspace (one node per source file or declaration, each
/// tagged with its absolute source path) and files every node under the
/// package that owns it. Packages come from the workspace manifest
/// (lerna.json "packages", or package.json "workspaces").
///
/// QUICK START:
///
///   # See which packages doctree finds
///   doctree packages --format=text
///
///   # Regroup a forest, leaving test helpers and an internal package out
///   doctree reorganize --input forest.json \
///       --path-exclude /test/ --lerna-exclude internal-tools
///
/// CONFIGURATION:
///
///   doctree.toml in the workspace root sets the same options
///   persistently ([reorganize] lerna_exclude / path_exclude).
#[derive(Parser)]
#[command(name = "doctree")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'doctree <command> --help' for more information on a specific command.")]
struct Cli {
    /// Workspace root (default: current directory)
    #[arg(long, global = true, env = "DOCTREE_CWD")]
    cwd: Option<PathBuf>,

    /// Config file (default: <root>/doctree.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format: json, toon, or text
    #[arg(long, global = true, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the packages declared by the workspace manifest
    Packages,

    /// Regroup a documentation forest by package
    ///
    /// Reads the forest as JSON, files every node under its owning package
    /// and writes the result. Module-shaped nodes (whole files) are merged
    /// into their package; their declarations move up one level. Nothing is
    /// written if any node falls outside every package.
    Reorganize(ReorganizeArgs),

    /// Print shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
struct ReorganizeArgs {
    /// Forest JSON to read ('-' for stdin)
    #[arg(long, short, default_value = "-")]
    input: PathBuf,

    /// Write the result here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Leave this package out of the output (repeatable)
    #[arg(long = "lerna-exclude", value_name = "PACKAGE")]
    lerna_exclude: Vec<String>,

    /// Drop nodes whose source path contains this text (repeatable)
    #[arg(long = "path-exclude", value_name = "TEXT")]
    path_exclude: Vec<String>,

    /// Do not attach README contents to packages
    #[arg(long)]
    no_readme: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format);

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "doctree", &mut std::io::stdout());
        return Ok(());
    }

    let ctx = Context::load(cli.cwd.as_deref(), cli.config.as_deref(), cli.format)?;
    match cli.command {
        Commands::Packages => emit(&commands::packages(&ctx)?, None),
        Commands::Reorganize(args) => {
            let request = ReorganizeRequest {
                input: Some(args.input),
                lerna_exclude: args.lerna_exclude,
                path_exclude: args.path_exclude,
                no_readme: args.no_readme,
            };
            let rendered = commands::reorganize(&ctx, &request)?;
            emit(&rendered, args.output)
        }
        Commands::Completions { .. } => Ok(()),
    }
}

fn emit(rendered: &str, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            let mut text = rendered.to_owned();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            std::fs::write(&path, text).with_context(|| format!("could not write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            if !rendered.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}
