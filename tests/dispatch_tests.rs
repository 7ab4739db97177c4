// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::{self, BufRead, Read};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context as _;
use botconsole::commands::CommandBody;
use botconsole::config::Settings;
use botconsole::console::{Capture, Listener};
use botconsole::{
    Command, CommandError, Console, ConsoleBuilder, ConsoleEvent, Context, EventKind,
};

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Listener recording "<event name>" or "<event name>:<error kind>".
fn recorder(log: &Log) -> impl Listener + 'static {
    let log = log.clone();
    move |event: ConsoleEvent| {
        let log = log.clone();
        async move {
            let entry = match &event {
                ConsoleEvent::CommandError { error, .. } => {
                    format!("{}:{}", event.name(), error.kind())
                }
                _ => event.name().to_string(),
            };
            log.lock().unwrap().push(entry);
            Ok::<(), anyhow::Error>(())
        }
    }
}

fn observed(builder: ConsoleBuilder, log: &Log) -> ConsoleBuilder {
    builder
        .listener(EventKind::Command, recorder(log))
        .listener(EventKind::CommandError, recorder(log))
        .listener(EventKind::CommandCompletion, recorder(log))
}

struct Harness {
    console: Console,
    output: Capture,
    errors: Capture,
}

fn harness(builder: ConsoleBuilder) -> Harness {
    let output = Capture::new();
    let errors = Capture::new();
    let console = builder
        .output(output.shared())
        .error_output(errors.shared())
        .build()
        .unwrap();
    Harness {
        console,
        output,
        errors,
    }
}

fn body_logging(log: &Log, entry: &'static str) -> impl CommandBody + 'static {
    let log = log.clone();
    move |_ctx: Context| {
        log.lock().unwrap().push(entry.to_string());
        std::future::ready(Ok::<(), CommandError>(()))
    }
}

#[tokio::test]
async fn test_successful_invocation_event_order() {
    let log = new_log();
    let mut h = harness(observed(Console::builder(), &log));
    h.console
        .register(Command::new("ping", body_logging(&log, "body")))
        .unwrap();

    h.console.process_commands("ping").await;

    assert_eq!(
        entries(&log),
        vec!["console_command", "body", "console_command_completion"]
    );
    assert!(h.errors.contents().is_empty());
}

#[tokio::test]
async fn test_unknown_command_emits_single_not_found() {
    let log = new_log();
    let mut h = harness(observed(Console::builder(), &log));
    h.console
        .register(Command::new("ping", body_logging(&log, "body")))
        .unwrap();

    h.console.process_commands("pong now").await;

    assert_eq!(
        entries(&log),
        vec!["console_command_error:CommandNotFound"]
    );
}

#[tokio::test]
async fn test_blank_line_emits_nothing() {
    let log = new_log();
    let h = harness(observed(Console::builder(), &log));

    h.console.process_commands("").await;
    h.console.process_commands("    ").await;

    assert!(entries(&log).is_empty());
    assert!(h.errors.contents().is_empty());
}

#[tokio::test]
async fn test_failing_command_check() {
    let log = new_log();
    let mut h = harness(observed(Console::builder(), &log));
    h.console
        .register(
            Command::new("secret", body_logging(&log, "body")).with_check(|_: &Context| false),
        )
        .unwrap();

    h.console.process_commands("secret").await;

    assert_eq!(
        entries(&log),
        vec!["console_command", "console_command_error:CheckFailure"]
    );
}

#[tokio::test]
async fn test_failing_parent_check_skips_parent_and_child_bodies() {
    let log = new_log();
    let mut h = harness(observed(Console::builder(), &log));
    h.console
        .register(
            Command::group("admin", body_logging(&log, "admin"))
                .with_check(|_: &Context| false)
                .with_subcommand(Command::new("reset", body_logging(&log, "reset")))
                .unwrap(),
        )
        .unwrap();

    h.console.process_commands("admin reset").await;

    assert_eq!(
        entries(&log),
        vec!["console_command", "console_command_error:CheckFailure"]
    );
}

#[tokio::test]
async fn test_failing_body_emits_error_without_completion() {
    let log = new_log();
    let mut h = harness(observed(Console::builder(), &log));
    h.console
        .register(Command::new("fail", |_ctx: Context| async {
            Err::<(), _>(CommandError::Invoke(anyhow::anyhow!("boom")))
        }))
        .unwrap();

    h.console.process_commands("fail").await;

    assert_eq!(
        entries(&log),
        vec!["console_command", "console_command_error:CommandInvokeError"]
    );
}

#[tokio::test]
async fn test_subcommand_receives_remaining_arguments() {
    let seen = new_log();
    let sink = seen.clone();
    let mut h = harness(Console::builder());
    h.console
        .register(
            Command::group("config", |_ctx: Context| async { Ok::<(), CommandError>(()) })
                .with_subcommand(Command::new("set", move |ctx: Context| {
                    let sink = sink.clone();
                    async move {
                        let args = ctx.args()?;
                        sink.lock().unwrap().extend(args);
                        Ok::<(), CommandError>(())
                    }
                }))
                .unwrap(),
        )
        .unwrap();

    h.console
        .process_commands("config set greeting \"hello world\"")
        .await;

    assert_eq!(entries(&seen), vec!["greeting", "hello world"]);
}

#[tokio::test]
async fn test_default_report_for_unknown_command() {
    let h = harness(Console::builder());

    h.console.process_commands("nope").await;

    assert_eq!(
        h.errors.contents(),
        "Ignoring exception in command nope:\n\
         CommandNotFound: Console command \"nope\" is not found\n"
    );
}

#[tokio::test]
async fn test_default_report_includes_cause_chain() {
    let mut h = harness(Console::builder());
    h.console
        .register(Command::new("load", |_ctx: Context| async {
            let inner: anyhow::Result<()> = Err(anyhow::anyhow!("disk unplugged"));
            inner.context("could not load state")?;
            Ok::<(), CommandError>(())
        }))
        .unwrap();

    h.console.process_commands("load").await;

    assert_eq!(
        h.errors.contents(),
        "Ignoring exception in command load:\n\
         CommandInvokeError: Command raised an exception: could not load state\n\
         Caused by: disk unplugged\n"
    );
}

#[tokio::test]
async fn test_report_suppressed_by_error_listener() {
    let log = new_log();
    let h = harness(Console::builder().listener(EventKind::CommandError, recorder(&log)));

    h.console.process_commands("nope").await;

    assert!(h.errors.contents().is_empty());
    assert_eq!(entries(&log).len(), 1);
}

#[tokio::test]
async fn test_report_suppressed_by_command_error_handler() {
    let handled = new_log();
    let sink = handled.clone();
    let mut h = harness(Console::builder());
    h.console
        .register(
            Command::new("fail", |_ctx: Context| async {
                Err::<(), _>(CommandError::BadArgument("missing name".into()))
            })
            .with_error_handler(move |_: &Context, err: &CommandError| {
                sink.lock().unwrap().push(err.to_string())
            }),
        )
        .unwrap();

    h.console.process_commands("fail").await;

    assert!(h.errors.contents().is_empty());
    assert_eq!(entries(&handled), vec!["Bad argument: missing name"]);
}

#[tokio::test]
async fn test_report_disabled_in_settings() {
    let mut settings = Settings::default();
    settings.errors.report_unhandled = false;
    let h = harness(Console::builder().settings(settings));

    h.console.process_commands("nope").await;

    assert!(h.errors.contents().is_empty());
}

#[tokio::test]
async fn test_help_command_writes_listing() {
    let mut h = harness(Console::builder());
    h.console
        .register(
            Command::new("ping", |_ctx: Context| async { Ok::<(), CommandError>(()) })
                .with_description("Reply with pong"),
        )
        .unwrap();

    h.console.process_commands("help").await;
    let listing = h.output.contents();
    assert!(listing.contains("help  Show this message"));
    assert!(listing.contains("ping  Reply with pong"));

    h.output.clear();
    h.console.process_commands("help ping").await;
    assert!(h.output.contents().starts_with("ping\n"));

    h.console.process_commands("help missing").await;
    assert!(h
        .errors
        .contents()
        .contains("Ignoring exception in command help:\nCommandNotFound"));
}

#[tokio::test]
async fn test_help_aliases_from_settings() {
    let mut settings = Settings::default();
    settings.help.name = "commands".to_string();
    settings.help.aliases = vec!["?".to_string()];
    let h = harness(Console::builder().settings(settings));

    assert!(h.console.get_command("help").is_none());
    h.console.process_commands("?").await;
    assert!(h
        .output
        .contents()
        .contains("Type \"commands <command>\" for more information on a command."));
}

#[tokio::test]
async fn test_unregister_through_console() {
    let mut h = harness(Console::builder());
    h.console
        .register(
            Command::new("ping", |_ctx: Context| async { Ok::<(), CommandError>(()) })
                .with_alias("p"),
        )
        .unwrap();

    assert_eq!(h.console.unregister("p").unwrap().unwrap().name(), "ping");
    assert!(h.console.get_command("p").is_none());
    assert!(h.console.get_command("ping").is_some());

    h.console.unregister("ping").unwrap();
    assert!(h.console.get_command("ping").is_none());
}

#[tokio::test]
async fn test_run_consumes_input_until_shutdown() {
    let log = new_log();
    let mut h = harness(
        observed(Console::builder(), &log).input(std::io::Cursor::new("ping\n\n  ping  \nnope\n")),
    );
    h.console
        .register(Command::new("ping", body_logging(&log, "body")))
        .unwrap();

    let shutdown = h.console.shutdown_handle();
    let input = h.console.start_input().unwrap();
    shutdown.on_input_exit(input).unwrap();

    tokio::time::timeout(Duration::from_secs(5), h.console.run())
        .await
        .expect("console did not stop")
        .unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "console_command",
            "body",
            "console_command_completion",
            "console_command",
            "body",
            "console_command_completion",
            "console_command_error:CommandNotFound",
        ]
    );
}

/// Reader that never yields a line, like an idle terminal.
struct IdleTerminal;

impl Read for IdleTerminal {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        loop {
            std::thread::park();
        }
    }
}

impl BufRead for IdleTerminal {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        loop {
            std::thread::park();
        }
    }

    fn consume(&mut self, _amt: usize) {}
}

#[test]
fn test_quit_returns_while_input_is_still_blocked() {
    let (done_tx, done_rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut h = harness(Console::builder().input(IdleTerminal));
        let shutdown = h.console.shutdown_handle();
        let quit = shutdown.clone();
        h.console
            .register(Command::new("quit", move |_ctx: Context| {
                let quit = quit.clone();
                async move {
                    quit.shutdown();
                    Ok::<(), CommandError>(())
                }
            }))
            .unwrap();

        let input = h.console.start_input().unwrap();
        shutdown.on_input_exit(input).unwrap();
        h.console.emitter().console_message("quit");

        let result = runtime.block_on(h.console.run());
        drop(runtime);
        let _ = done_tx.send(result.is_ok());
    });

    let stopped = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("console kept running after quit");
    assert!(stopped);
}

proptest::proptest! {
    #[test]
    fn prop_any_line_yields_at_most_one_outcome(line in "[ a-z\"]{0,24}") {
        let log = new_log();
        let mut h = harness(observed(Console::builder(), &log));
        h.console
            .register(Command::new("a", |_ctx: Context| async { Ok::<(), CommandError>(()) }))
            .unwrap();

        tokio_test::block_on(h.console.process_commands(&line));

        let seen = entries(&log);
        let outcomes = seen
            .iter()
            .filter(|e| {
                *e == "console_command_completion" || e.starts_with("console_command_error")
            })
            .count();
        proptest::prop_assert!(outcomes <= 1);
        proptest::prop_assert_eq!(seen.is_empty(), line.trim().is_empty());
    }
}
