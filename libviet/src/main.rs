use anyhow::{Context, Result};
use libviet::{engine_from_config, lookup, Engine, Mode, VietConfig};
use std::io::{self, BufRead, Write};

fn load_config() -> Result<VietConfig> {
    match std::env::var_os("LIBVIET_CONFIG") {
        Some(path) => VietConfig::load_toml(&path)
            .with_context(|| format!("loading config from {}", path.to_string_lossy())),
        None => Ok(VietConfig::default()),
    }
}

/// Handle a `:command` line. Returns false for unknown commands.
fn run_command(engine: &mut Engine, command: &str) -> bool {
    let mut parts = command.splitn(2, ' ');
    match (parts.next(), parts.next()) {
        (Some("reset"), None) => {
            engine.reset();
            println!("  (cleared)");
        }
        (Some("im"), Some(name)) => match lookup(name.trim()) {
            Ok(im) => {
                println!("  input method: {}", im.name);
                *engine = Engine::new(im, engine.flags());
            }
            Err(e) => println!("  ⚠ {e}"),
        },
        _ => return false,
    }
    true
}

fn main() -> Result<()> {
    println!("═══════════════════════════════════════════════════");
    println!("  libviet - Interactive Vietnamese Input Test");
    println!("═══════════════════════════════════════════════════");
    println!();

    let config = load_config()?;
    let mut engine = engine_from_config(&config)?;

    println!("Input method: {}", engine.input_method().name);
    println!("Type keys and press Enter. Examples: tieengs vieetj, dduwongf");
    println!("Commands: :reset, :im <name> ({})", libviet::input_method_names().join(", "));
    println!("Press Ctrl+C to exit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let raw = line.context("reading stdin")?;
        let input = raw.trim_end();
        if let Some(command) = input.strip_prefix(':') {
            if !run_command(&mut engine, command) {
                println!("  unknown command :{command}");
            }
            continue;
        }

        for key in input.chars() {
            engine.process_key(key, Mode::VIETNAMESE);
        }
        println!("  vi: {}", engine.get_processed_string(config.base().output_mode()));
        println!("  en: {}", engine.get_processed_string(Mode::ENGLISH));
        println!("  valid: {}", engine.is_valid(true));
        println!();
        stdout.flush()?;
    }
    Ok(())
}
