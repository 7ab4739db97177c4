// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! botconsole - interactive command console
//!
//! Entry point for the demo binary: a console with a few built-in commands
//! reading from stdin.

use std::io;

use clap::Parser;
use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};

use botconsole::cli::Cli;
use botconsole::config::Settings;
use botconsole::console::{Console, ConsoleEvent, EventKind};
use botconsole::error::Result;

#[path = "main/demo_commands.rs"]
mod demo_commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load_from(&settings_path)?;
    if cli.no_help {
        settings.help.enabled = false;
    }

    init_tracing(&settings, cli.verbose);

    if cli.write_settings {
        settings.save_to(&settings_path)?;
        println!("Settings written to {}", settings_path.display());
        return Ok(());
    }

    let mut console = Console::builder()
        .settings(settings)
        .listener(EventKind::CommandCompletion, |event: ConsoleEvent| async move {
            if let Some(ctx) = event.context() {
                let elapsed = chrono::Utc::now() - ctx.created_at();
                tracing::debug!(
                    target: "botconsole.main",
                    command = %ctx.label(),
                    elapsed_ms = elapsed.num_milliseconds(),
                    "command completed"
                );
            }
            Ok::<(), anyhow::Error>(())
        })
        .build()?;

    let shutdown = console.shutdown_handle();
    demo_commands::register_all(&mut console, &settings_path, shutdown.clone())?;

    print_banner(&console)?;

    // The watcher is detached: a stdin read still pending after `quit` must
    // not keep the process alive.
    let input = console.start_input()?;
    shutdown.on_input_exit(input)?;

    console.run().await
}

fn init_tracing(settings: &Settings, verbose: u8) {
    // RUST_LOG wins over the settings file.
    let mut env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.filter));

    if verbose > 0 {
        let level = if verbose > 1 { "trace" } else { "debug" };
        for target in [
            "botconsole.console",
            "botconsole.dispatch",
            "botconsole.input",
            "botconsole.registry",
            "botconsole.main",
        ] {
            if let Ok(parsed) = format!("{}={}", target, level).parse() {
                env_filter = env_filter.add_directive(parsed);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn print_banner(console: &Console) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    println!("botconsole v{}", env!("CARGO_PKG_VERSION"));
    stdout.execute(ResetColor)?;
    println!("{} commands registered", console.registry().len());
    if console.settings().help.enabled {
        println!(
            "Type \"{}\" for a list of commands.",
            console.settings().help.name
        );
    }
    Ok(())
}
