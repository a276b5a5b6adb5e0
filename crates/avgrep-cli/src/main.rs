//! avgrep — grep through nested archives via an avfs mountpoint.
//!
//! avfs mirrors the filesystem under `~/.avfs`, serving every archive's
//! contents as a virtual directory named after the archive plus `#`.
//! avgrep walks that namespace, unfolds archives of arbitrary nesting
//! depth, filters the candidate files, and runs the grep family over the
//! survivors:
//!
//! ```bash
//! avgrep -r "password" ~/backups --er .log --er .txt -- -i
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use avgrep_core::{AvfsMount, AvfsWalker, FileCmd, FilterSpec, GrepSearcher, LocalFs, Match, Searcher};

#[derive(Debug, Parser)]
#[command(name = "avgrep", version, about = "grep through nested archives via an avfs mountpoint")]
struct Cli {
    /// Regex handed to grep
    #[arg(short = 'r', long = "regex")]
    regex: String,

    /// Root paths to search (defaults to the current directory)
    paths: Vec<PathBuf>,

    /// Keep only files whose full path contains this pattern (repeatable)
    #[arg(long = "pr", value_name = "PATTERN")]
    path_filter: Vec<String>,

    /// Keep only files whose name contains this pattern (repeatable)
    #[arg(long = "fr", value_name = "PATTERN")]
    name_filter: Vec<String>,

    /// Keep only files whose extension contains this pattern (repeatable)
    #[arg(long = "er", value_name = "PATTERN")]
    extension_filter: Vec<String>,

    /// Log walk statistics
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Extra options passed to grep verbatim, after `--`
    #[arg(last = true, value_name = "GREP_OPTIONS")]
    grep_options: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let home = directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .context("could not resolve home directory")?;
    let mount = AvfsMount::new(home);

    if !tokio::fs::try_exists(mount.root()).await.unwrap_or(false) {
        bail!(
            "avfs mountpoint '{}' not found — is avfs mounted?",
            mount.root().display()
        );
    }

    let spec = FilterSpec::new()
        .with_path(cli.path_filter)
        .with_file_name(cli.name_filter)
        .with_extension(cli.extension_filter);

    let fs = LocalFs::new();
    let roots = resolve_roots(&fs, &mount, &cli.paths).await?;

    let walker = AvfsWalker::new(&fs, &mount);
    let files = walker.walk_many(&roots, &spec).await;

    if cli.verbose {
        info!(count = files.len(), "found files to grep");
    }

    let searcher = GrepSearcher::new(&cli.regex, cli.grep_options.clone(), Arc::new(FileCmd::new()));

    let mut matches = Vec::new();
    for file in &files {
        match searcher.search(file).await {
            Ok(found) => matches.extend(found),
            Err(err) => warn!(path = %file.display(), %err, "search failed for file"),
        }
    }

    if matches.is_empty() {
        println!("No matches found");
        return Ok(());
    }

    println!("\n### Matches ###");
    for m in &matches {
        print_match(&mount, m);
    }

    Ok(())
}

/// Translate requested roots into the mount. A root that stats as a file
/// is entered through its archive mirror; a root that cannot be statted
/// is reported and skipped so the remaining roots still run.
async fn resolve_roots(
    fs: &LocalFs,
    mount: &AvfsMount,
    paths: &[PathBuf],
) -> Result<Vec<PathBuf>> {
    use avgrep_core::Filesystem;

    let requested: Vec<PathBuf> = if paths.is_empty() {
        vec![std::env::current_dir().context("could not resolve current directory")?]
    } else {
        paths
            .iter()
            .map(|p| std::path::absolute(p).with_context(|| format!("bad path: {}", p.display())))
            .collect::<Result<_>>()?
    };

    let mut roots = Vec::new();
    for path in requested {
        let virtual_root = mount.mount_path(&path);
        match fs.stat(&virtual_root).await {
            Ok(info) if info.is_file() => roots.push(AvfsMount::archive_mirror(&virtual_root)),
            Ok(_) => roots.push(virtual_root),
            Err(err) => {
                warn!(
                    path = %virtual_root.display(),
                    %err,
                    "cannot stat root, skipping"
                );
            }
        }
    }

    Ok(roots)
}

/// `real/path/to/file#42: matched text` — the marker doubles as a
/// readable line-number separator.
fn print_match(mount: &AvfsMount, m: &Match) {
    println!(
        "{}#{}: {}",
        mount.to_real_path(&m.path).display(),
        m.line,
        m.text
    );
}
