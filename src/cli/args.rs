// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::Parser;
use std::path::PathBuf;

/// botconsole - interactive command console for bots
#[derive(Parser, Debug)]
#[command(name = "botconsole")]
#[command(version, about = "Interactive command console for bots")]
pub struct Cli {
    /// Settings file path (defaults to ~/.botconsole/settings.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Do not register the built-in help command
    #[arg(long)]
    pub no_help: bool,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    pub write_settings: bool,
}
