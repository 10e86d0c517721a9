use clap::Parser;
use ferrite_gate::{validate_with, ValidatorOptions, DEFAULT_MAX_DEPTH};
use log::LevelFilter;
use miette::{Context, IntoDiagnostic, NamedSource, Result};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ferrite-gate")]
#[command(about = "checks that files are well-formed json and points at the first mistake", long_about = None)]
struct Cli {
    /// Files to check; `-` or nothing reads stdin
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Deepest nesting of objects and arrays to accept
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Accept a bare string, number, boolean or null as the whole document
    #[arg(long)]
    allow_scalar_root: bool,

    /// More log output, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    let level = match verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };
    if let Some(level) = level {
        builder.filter_level(level);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Warn);
    }
    builder.init();
}

fn read_input(path: &Path) -> Result<(String, Vec<u8>)> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .into_diagnostic()
            .wrap_err("Failed to read stdin")?;
        return Ok(("<stdin>".to_string(), buf));
    }
    let content = fs::read(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read file '{}'", path.display()))?;
    Ok((path.display().to_string(), content))
}

fn main() -> Result<()> {
    miette::set_panic_hook();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = ValidatorOptions::default()
        .with_max_depth(cli.max_depth)
        .with_scalar_root(cli.allow_scalar_root);
    let files = if cli.files.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        cli.files
    };

    for path in &files {
        let (name, content) = read_input(path)?;
        log::info!("checking {name} ({} bytes)", content.len());
        if let Err(err) = validate_with(&content, &options) {
            return Err(miette::Report::new(err).with_source_code(NamedSource::new(name, content)));
        }
        println!("{name} is valid!");
    }
    Ok(())
}
