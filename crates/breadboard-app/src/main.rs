//! Main application entry point.

use breadboard_app::Cli;
use clap::Parser;
use std::io::Write;

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Starting Breadboard");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = breadboard_app::run(cli, &mut out) {
        let _ = out.flush();
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
