use anyhow::{Context, Result};
use clap::Parser;
use libviet::{Engine, Mode, VietConfig, engine_from_config, input_method_names};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Convert Telex/VNI/VIQR key sequences to Vietnamese text.
#[derive(Parser)]
#[command(name = "vietconv", version)]
struct Args {
    /// Input method name (see --list)
    #[arg(short = 'm', long)]
    input_method: Option<String>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the keys as typed instead of converting them
    #[arg(long)]
    english: bool,

    /// List the built-in input methods and exit
    #[arg(long)]
    list: bool,

    /// Log engine decisions to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Read lines from a file instead of stdin
    #[arg(long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Text to convert; each argument is one line
    text: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<VietConfig> {
    let mut config = match &args.config {
        Some(path) => VietConfig::load_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => VietConfig::default(),
    };
    if let Some(name) = &args.input_method {
        config.input_method = name.clone();
    }
    Ok(config)
}

fn convert_line(engine: &mut Engine, line: &str, mode: Mode) -> String {
    engine.reset();
    engine.process_string(line, Mode::VIETNAMESE);
    engine.get_processed_string(mode | Mode::FULL_TEXT)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.list {
        for name in input_method_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let config = load_config(&args)?;
    let mut engine = engine_from_config(&config)
        .with_context(|| format!("building engine for {:?}", config.input_method))?;
    info!(input_method = %config.input_method, flags = ?engine.flags(), "engine ready");

    let mode = if args.english {
        Mode::ENGLISH
    } else {
        config.base().output_mode()
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !args.text.is_empty() {
        for line in &args.text {
            writeln!(out, "{}", convert_line(&mut engine, line, mode))?;
        }
        return Ok(());
    }

    let reader: Box<dyn BufRead> = match &args.file {
        Some(path) => {
            debug!(path = %path.display(), "reading input file");
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    for (n, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", n + 1))?;
        writeln!(out, "{}", convert_line(&mut engine, &line, mode))?;
    }
    out.flush()?;
    Ok(())
}
