use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use statusdat_config::Config;
use statusdat_engine::{InputSource, LogListener, StatusParser};
use std::{fs, path::PathBuf, process, rc::Rc};

/// Convert a Nagios status.dat file into XML, JSON or another registered format
#[derive(Parser, Debug)]
#[command(name = "statusdat", version)]
struct Args {
    /// Status file to read, `-` for standard input
    #[arg(value_name = "FILE")]
    file: Option<String>,

    /// Output format
    #[arg(short, long)]
    format: Option<String>,

    /// Write the rendered document to this file instead of standard output
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Config file to use instead of ~/.config/statusdat/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List the available formats and exit
    #[arg(long)]
    list_formats: bool,

    /// Print every diagnostic message as a JSON line on stderr when done
    #[arg(long)]
    messages: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match run(args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }
}

/// Returns whether rendering succeeded. Configuration problems are `Err`.
fn run(args: Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    }
    .unwrap_or_default();
    log::debug!("Using config: {config:?}");

    let source = select_source(args.file.as_deref(), &config);
    let mut parser = StatusParser::new(source).with_options(config.parser_options());
    if let Some(default_format) = &config.default_format {
        parser
            .registry_mut()
            .set_default(default_format)
            .with_context(|| format!("Invalid default_format in config: {default_format}"))?;
    }

    if args.list_formats {
        let default = parser.registry().default_name();
        for name in parser.registry().names() {
            let marker = if name == default { " (default)" } else { "" };
            println!("{name}{marker}");
        }
        return Ok(true);
    }

    parser.subscribe(Rc::new(LogListener));

    let format = args.format.as_deref();
    let rendered = match &args.output {
        Some(path) => match parser.render_to_string(format) {
            Ok(document) => {
                fs::write(path, document)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                true
            }
            Err(_) => false,
        },
        None => parser.render(format).is_ok(),
    };

    if args.messages {
        for message in parser.history() {
            eprintln!("{}", serde_json::to_string(message)?);
        }
    }

    Ok(rendered)
}

fn select_source(file: Option<&str>, config: &Config) -> InputSource {
    match (file, &config.status_file) {
        (Some(arg), _) => InputSource::from_arg(arg),
        (None, Some(path)) => InputSource::path(path),
        (None, None) => InputSource::Stdin,
    }
}
