//! sugarcoat — generate a pattern library from annotated source comments.
//!
//! `sugarcoat [CONFIG] [-d DIR] [-f html|json]`
//!
//! The config is a JSON file (default `sugarcoat.json`). Relative file
//! patterns and `dest` resolve against `--root`, or the working directory.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use sugarcoat::config::{RawConfig, DEST_NONE};
use sugarcoat::discover::FsGlobber;
use sugarcoat::pipeline::{FsReader, Pipeline};
use sugarcoat::render;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sugarcoat",
    version,
    about = "Build a pattern library from annotated CSS, markup and script comments"
)]
struct Cli {
    /// JSON configuration file
    #[arg(default_value = "sugarcoat.json")]
    config: PathBuf,

    /// Override the configured destination directory ("none" skips writing)
    #[arg(short = 'd', long)]
    dest: Option<String>,

    /// Output format: html (default), json
    #[arg(short = 'f', long, default_value = "html")]
    format: String,

    /// Directory that relative patterns and dest resolve against
    #[arg(long)]
    root: Option<PathBuf>,

    /// Log debug detail (overridden by RUST_LOG)
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long)]
    quiet: bool,
}

impl Cli {
    fn default_filter(&self) -> &'static str {
        if self.verbose {
            "sugarcoat=debug"
        } else if self.quiet {
            "error"
        } else {
            "sugarcoat=info"
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<sugarcoat::Error>() {
                Some(run_err) => eprintln!("error[{}]: {}", run_err.kind(), run_err),
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let mut raw = load_config(&cli.config)?;
    if let Some(dest) = &cli.dest {
        raw.dest = Some(dest.clone());
    }
    let globber = match &cli.root {
        Some(root) => {
            raw.dest = raw.dest.map(|d| rebase_dest(&d, root));
            FsGlobber::with_base(root)
        }
        None => FsGlobber::default(),
    };

    let renderer = render::create_renderer(&cli.format)?;
    let pipeline = Pipeline::new(globber, FsReader).with_boxed_renderer(renderer);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("failed to start runtime")?;
    let library = runtime.block_on(pipeline.run(raw))?;

    if let Some(path) = &library.output {
        println!("{}", path.display());
    }
    Ok(())
}

/// Read and deserialize the JSON configuration file.
fn load_config(path: &Path) -> Result<RawConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config: {}", path.display()))
}

/// Resolve a relative destination against `root`, leaving the sentinel alone.
fn rebase_dest(dest: &str, root: &Path) -> String {
    if dest == DEST_NONE || dest.is_empty() || Path::new(dest).is_absolute() {
        return dest.to_string();
    }
    root.join(dest).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebase_relative_dest() {
        let root = Path::new("/srv/site");
        assert_eq!(rebase_dest("docs", root), "/srv/site/docs");
    }

    #[test]
    fn rebase_keeps_none_and_absolute() {
        let root = Path::new("/srv/site");
        assert_eq!(rebase_dest("none", root), "none");
        assert_eq!(rebase_dest("/tmp/out", root), "/tmp/out");
        assert_eq!(rebase_dest("", root), "");
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["sugarcoat"]);
        assert_eq!(cli.config, PathBuf::from("sugarcoat.json"));
        assert_eq!(cli.format, "html");
        assert_eq!(cli.default_filter(), "sugarcoat=info");
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["sugarcoat", "-v", "-q"]).is_err());
    }
}
