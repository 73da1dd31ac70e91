use clap::{Parser, Subcommand};
use cobello::hooks::HookRegistry;
use cobello::pipeline::{self, BuildOptions};
use cobello::{check, config, output};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cobello")]
#[command(about = "Incremental static site generator for Markdown blogs")]
#[command(long_about = "\
Incremental static site generator for Markdown blogs

Every build renders all content, but only writes outputs whose bytes
changed since the last run. Digests live in .pycobello/cache.json.

Project structure:

  cobello.toml                     # Site config (optional)
  content/
  ├── posts/                       # Posts → /blog/<slug>
  │   └── 2024-01-15-hello.md      # Date prefix is dropped from the slug
  └── pages/                       # Pages → /<slug>
      └── about.md
  theme/
  ├── templates/                   # Tera: index.html, post.html, page.html
  └── static/                      # Copied to dist/static/
  static/                          # Copied after theme/static/ (wins on clashes)

Slug resolution (first available wins):
  front matter slug → front matter title → file stem")]
#[command(version)]
struct Cli {
    /// Log every write and skip decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site into the output directory
    Build {
        /// Project root containing cobello.toml
        #[arg(default_value = ".")]
        project_root: PathBuf,

        /// Delete the output directory and cache before building
        #[arg(long)]
        clean: bool,
    },
    /// Validate content without building
    Check {
        /// Project root containing cobello.toml
        #[arg(default_value = ".")]
        project_root: PathBuf,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build {
            project_root,
            clean,
        } => {
            let site_config = config::load_config(&project_root)?;
            let hooks = HookRegistry::new();
            let result =
                pipeline::build(&site_config, &project_root, BuildOptions { clean }, &hooks)?;
            if !result.is_success() {
                output::print_errors(&result.errors);
                return Ok(ExitCode::FAILURE);
            }
            output::print_build_output(&result, cli.verbose);
        }
        Command::Check { project_root } => {
            let site_config = config::load_config(&project_root)?;
            let messages = check::run_checks(&site_config, &project_root);
            output::print_check_output(&messages, &project_root);
            if !messages.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// `--verbose` forces debug output; otherwise `RUST_LOG` decides, defaulting to warnings.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
