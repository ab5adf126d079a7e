use clap::{Parser, Subcommand};
use simple_docs::compose::SiteContext;
use simple_docs::{config, generate, index, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-docs")]
#[command(about = "Static site generator for markdown documentation")]
#[command(long_about = "\
Static site generator for markdown documentation

Your filesystem is the data source. Every markdown file becomes a page,
numeric prefixes order siblings and are dropped from URLs.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── 01_guide.md                  # /guide/         (index: true lists children)
  ├── 01_guide/
  │   ├── 01_install.md            # /guide/install/
  │   └── 02_usage.md              # /guide/usage/
  └── about.md                     # /about/

Frontmatter:

  ---
  title: Installation              # Page title, breadcrumbs, listings
  index: true                      # List immediate child pages
  ---

Set GITHUB_SHA to stamp pages with a git-sha-<revision> build id.

Run 'simple-docs gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".simple-docs-temp", global = true)]
    temp_dir: PathBuf,

    /// Log diagnostics at debug level (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index the content directory into a manifest
    Index,
    /// Produce the HTML site from the manifest
    Generate,
    /// Run the full pipeline: index → generate
    Build,
    /// Index and render every page without writing output
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Index => {
            let manifest = scan_source(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_index_output(&manifest, &cli.source);
        }
        Command::Generate => {
            let manifest_path = cli.temp_dir.join("manifest.json");
            let manifest_content = std::fs::read_to_string(&manifest_path)?;
            let manifest: index::Manifest = serde_json::from_str(&manifest_content)?;
            config::init_thread_pool(&manifest.config.processing);
            let report = generate::generate_from_manifest(
                &manifest,
                &cli.output,
                &generate::build_id_from_env(),
            )?;
            output::print_generate_output(&report);
        }
        Command::Build => {
            println!("==> Stage 1: Indexing {}", cli.source.display());
            let manifest = scan_source(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_index_output(&manifest, &cli.source);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let report = generate::generate_from_manifest(
                &manifest,
                &cli.output,
                &generate::build_id_from_env(),
            )?;
            output::print_generate_output(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan_source(&cli.source)?;
            output::print_index_output(&manifest, &cli.source);
            let site = SiteContext::new(manifest.config, generate::build_id_from_env());
            let pages = generate::render_site(&manifest.index, &site)?;
            output::print_check_output(&pages);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug and the
/// default is warnings only, so stage output stays readable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the site config, size the worker pool from it, then index.
///
/// The pool is global and fixed on first use, so it has to exist before
/// the parallel parse in the index stage.
fn scan_source(source: &Path) -> Result<index::Manifest, index::IndexError> {
    let config = config::load_config(source)?;
    config::init_thread_pool(&config.processing);
    index::scan_with_config(source, config)
}

/// Serialize the manifest into the temp dir and return its path.
fn write_manifest(manifest: &index::Manifest, temp_dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(temp_dir)?;
    let manifest_path = temp_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(manifest).map_err(std::io::Error::other)?;
    std::fs::write(&manifest_path, json)?;
    Ok(manifest_path)
}
