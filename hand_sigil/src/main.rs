//! hand_sigil — interactive entry point.

use clap::Parser;
use env_logger::Env;
use hand_sigil::app::{run, AppConfig, Cli};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Hand Sigil — spread to grow, fist to shatter        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware  (--sim for keyboard/mouse)");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard/mouse simulation  (use --features leap for hardware)");

    let cfg = match AppConfig::from_cli(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if cli.quick {
        println!("  Quick-start: stock settings");
    }

    println!();
    println!("  Opening window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
