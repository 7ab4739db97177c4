// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::Path;

use chrono::{DateTime, Utc};

use botconsole::console::output::{write_text, SharedWriter};
use botconsole::console::ShutdownHandle;
use botconsole::error::Result;
use botconsole::{Command, CommandError, Console, Context};

fn say(out: &SharedWriter, text: &str) -> std::result::Result<(), CommandError> {
    write_text(out, &format!("{}\n", text)).map_err(|e| CommandError::Invoke(e.into()))
}

pub(super) fn register_all(
    console: &mut Console,
    settings_path: &Path,
    shutdown: ShutdownHandle,
) -> Result<()> {
    let out = console.output();
    console.register(
        Command::new("echo", move |ctx: Context| {
            let out = out.clone();
            async move {
                let words = ctx.args()?;
                say(&out, &words.join(" "))
            }
        })
        .with_alias("say")
        .with_description("Print the arguments back"),
    )?;

    let started: DateTime<Utc> = Utc::now();
    let out = console.output();
    console.register(
        Command::new("uptime", move |_ctx: Context| {
            let out = out.clone();
            async move {
                let elapsed = Utc::now() - started;
                let line = format!(
                    "up {}h {:02}m {:02}s (since {})",
                    elapsed.num_hours(),
                    elapsed.num_minutes() % 60,
                    elapsed.num_seconds() % 60,
                    started.format("%Y-%m-%d %H:%M:%S UTC")
                );
                say(&out, &line)
            }
        })
        .with_description("Show how long the console has been running"),
    )?;

    let settings = console.settings().clone();
    let path = settings_path.display().to_string();
    let (out, show_out) = (console.output(), console.output());
    console.register(
        Command::group("settings", move |_ctx: Context| {
            let out = out.clone();
            let path = path.clone();
            async move { say(&out, &path) }
        })
        .invoke_without_command(true)
        .with_alias("config")
        .with_description("Show the settings file path, or `settings show`")
        .with_subcommand(
            Command::new("show", move |_ctx: Context| {
                let settings = settings.clone();
                let out = show_out.clone();
                async move {
                    let json = serde_json::to_string_pretty(&settings)
                        .map_err(|e| CommandError::Invoke(e.into()))?;
                    say(&out, &json)
                }
            })
            .with_description("Print the effective settings"),
        )?,
    )?;

    console.register(
        Command::new("quit", move |_ctx: Context| {
            let shutdown = shutdown.clone();
            async move {
                shutdown.shutdown();
                Ok::<(), CommandError>(())
            }
        })
        .with_alias("exit")
        .with_description("Stop the console"),
    )?;

    Ok(())
}
