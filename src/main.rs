use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{App, Arg};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

mod converter;
mod files;

use crate::converter::{convert_file, Options, Stats};

const DEFAULT_EXTENSIONS: [&str; 3] = ["c", "cpp", "h"];

fn main() {
    // Parse command line arguments.
    let args = App::new("to-utf8")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rewrites BOM-marked text files (UTF-8/16/32) in place as plain UTF-8")
        .arg(
            Arg::with_name("root")
                .help("Directory to search recursively")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("ext")
                .short("e")
                .long("ext")
                .value_name("EXT")
                .help("Extensions to convert, comma separated, case-insensitive (default: c,cpp,h)")
                .takes_value(true)
                .multiple(true)
                .use_delimiter(true)
                .require_delimiter(true),
        )
        .arg(
            Arg::with_name("dry_run")
                .short("n")
                .long("dry-run")
                .help("Detect and convert, but don't write anything"),
        )
        .arg(
            Arg::with_name("strict")
                .long("strict")
                .help("Don't rewrite files whose conversion would drop data"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log per-file details"),
        )
        .get_matches();

    init_logging(args.is_present("verbose"));

    let root = args.value_of_os("root").map(PathBuf::from).unwrap_or_default();
    let extensions = normalize_extensions(args.values_of("ext"));
    let options = Options {
        dry_run: args.is_present("dry_run"),
        strict: args.is_present("strict"),
    };

    match run(&root, &extensions, &options) {
        Ok(stats) => {
            println!("\n{}", stats);
            if !stats.is_success() {
                process::exit(1);
            }
        }
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}

/// `RUST_LOG` takes precedence; `--verbose` raises the default to DEBUG.
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Turns `--ext` values into bare lowercase extensions.  Falls back to
/// the defaults when none were given.
fn normalize_extensions<'a, I>(values: Option<I>) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let extensions: Vec<String> = values
        .into_iter()
        .flatten()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    if extensions.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    } else {
        extensions
    }
}

fn run(root: &Path, extensions: &[String], options: &Options) -> Result<Stats> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    info!(
        "converting *.{{{}}} under {}{}",
        extensions.join(","),
        root.display(),
        if options.dry_run { " (dry run)" } else { "" }
    );

    let start = Instant::now();
    let stats = convert_all(&files::find_files(root, extensions), options);
    info!("done in {:.2?}", start.elapsed());

    Ok(stats)
}

/// Converts each file in turn.  A file that fails is logged and counted,
/// and the rest are still converted.
fn convert_all(paths: &[PathBuf], options: &Options) -> Stats {
    let mut stats = Stats::new(options);
    for path in paths {
        println!("{}", path.display());
        match convert_file(path, options) {
            Ok(outcome) => stats.record(outcome),
            Err(e) => {
                error!("{:#}", e);
                stats.record_failure();
            }
        }
    }
    stats
}
