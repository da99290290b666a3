#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! Supports environment variable overrides via `BEAU_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use crate::theme;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Beau Chat - talk to Beau, your relationship coach

USAGE:
    beau-chat [OPTIONS]

OPTIONS:
    --reply-delay-ms=N        Delay before Beau replies (default: 1000)
    --tick-ms=N               Animation tick interval (default: 50)
    --background=ID           Starting background (default: telegram_blue)
    --no-mouse                Disable mouse event capture
    --inject-fault=MSG        Make the chat screen panic with MSG while rendering
    --inject-fault-renders=N  Only fault for the first N renders (default: always)
    --log-file=PATH           Write logs to PATH (default: logging off)
    --log-json                Write logs as JSON lines
    --help, -h                Show this help message
    --version, -V             Show version

BACKGROUNDS:
    telegram_blue, sunset_warm, ocean_deep, forest_green, purple_dream,
    midnight_blue

KEYBINDINGS:
    Enter                 Send message (or Try Again on the error screen)
    Up/Down, PgUp/PgDn    Scroll the conversation
    Ctrl+B                Choose background
    r                     Try Again on the error screen
    Esc / Ctrl+C          Quit

ENVIRONMENT VARIABLES:
    BEAU_REPLY_DELAY_MS         Override --reply-delay-ms
    BEAU_TICK_MS                Override --tick-ms
    BEAU_BACKGROUND             Override --background
    BEAU_INJECT_FAULT           Override --inject-fault
    BEAU_INJECT_FAULT_RENDERS   Override --inject-fault-renders
    BEAU_LOG_FILE               Override --log-file
    BEAU_LOG                    Log filter (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Delay before the scripted reply.
    pub reply_delay_ms: u64,
    /// Animation tick interval; never zero.
    pub tick_ms: u64,
    /// Index into [`theme::BACKGROUNDS`].
    pub background: usize,
    /// Whether mouse events are enabled.
    pub mouse: bool,
    /// Panic message injected into the chat screen's render.
    pub inject_fault: Option<String>,
    /// Number of faulting renders; `None` faults every render.
    pub inject_fault_renders: Option<u32>,
    pub log_file: Option<PathBuf>,
    pub log_json: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            reply_delay_ms: 1000,
            tick_ms: 50,
            background: 0,
            mouse: true,
            inject_fault: None,
            inject_fault_renders: None,
            log_file: None,
            log_json: false,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags. Prints help or version and exits when
    /// asked; exits with status 1 on invalid input.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Action::Run(opts)) => opts,
            Ok(Action::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Action::Version) => {
                println!("beau-chat {VERSION}");
                process::exit(0);
            }
            Err(message) => {
                eprintln!("{message}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse from explicit sources.
    ///
    /// # Errors
    ///
    /// Returns a printable message for unknown arguments or invalid values.
    pub fn parse_from<I, F>(args: I, env: F) -> Result<Action, String>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = env("BEAU_REPLY_DELAY_MS") {
            opts.reply_delay_ms = number("BEAU_REPLY_DELAY_MS", &val)?;
        }
        if let Some(val) = env("BEAU_TICK_MS") {
            opts.tick_ms = tick("BEAU_TICK_MS", &val)?;
        }
        if let Some(val) = env("BEAU_BACKGROUND") {
            opts.background = background("BEAU_BACKGROUND", &val)?;
        }
        if let Some(val) = env("BEAU_INJECT_FAULT") {
            opts.inject_fault = Some(val);
        }
        if let Some(val) = env("BEAU_INJECT_FAULT_RENDERS") {
            opts.inject_fault_renders = Some(number("BEAU_INJECT_FAULT_RENDERS", &val)?);
        }
        if let Some(val) = env("BEAU_LOG_FILE") {
            opts.log_file = Some(PathBuf::from(val));
        }

        // Parse command-line args (override env vars)
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Action::Help),
                "--version" | "-V" => return Ok(Action::Version),
                "--no-mouse" => opts.mouse = false,
                "--log-json" => opts.log_json = true,
                other => {
                    if let Some(val) = other.strip_prefix("--reply-delay-ms=") {
                        opts.reply_delay_ms = number("--reply-delay-ms", val)?;
                    } else if let Some(val) = other.strip_prefix("--tick-ms=") {
                        opts.tick_ms = tick("--tick-ms", val)?;
                    } else if let Some(val) = other.strip_prefix("--background=") {
                        opts.background = background("--background", val)?;
                    } else if let Some(val) = other.strip_prefix("--inject-fault=") {
                        opts.inject_fault = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--inject-fault-renders=") {
                        opts.inject_fault_renders = Some(number("--inject-fault-renders", val)?);
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        opts.log_file = Some(PathBuf::from(val));
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        Ok(Action::Run(opts))
    }
}

fn number<T: FromStr>(name: &str, val: &str) -> Result<T, String> {
    val.parse()
        .map_err(|_| format!("Invalid {name} value: {val}"))
}

fn tick(name: &str, val: &str) -> Result<u64, String> {
    match number(name, val)? {
        0 => Err(format!("Invalid {name} value: {val} (must be at least 1)")),
        n => Ok(n),
    }
}

fn background(name: &str, val: &str) -> Result<usize, String> {
    theme::background_index(val).ok_or_else(|| format!("Invalid {name} value: {val}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Action, String> {
        let env: Vec<(String, String)> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Opts::parse_from(args.iter().map(|s| s.to_string()), |key| {
            env.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
    }

    fn run(args: &[&str], env: &[(&str, &str)]) -> Opts {
        match parse(args, env) {
            Ok(Action::Run(opts)) => opts,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn default_opts() {
        let opts = Opts::default();
        assert_eq!(opts.reply_delay_ms, 1000);
        assert_eq!(opts.tick_ms, 50);
        assert_eq!(opts.background, 0);
        assert!(opts.mouse);
        assert_eq!(opts.inject_fault, None);
        assert_eq!(opts.log_file, None);
        assert_eq!(run(&[], &[]), opts);
    }

    #[test]
    fn flags_are_parsed() {
        let opts = run(
            &[
                "--reply-delay-ms=0",
                "--tick-ms=16",
                "--background=ocean_deep",
                "--no-mouse",
                "--inject-fault=Cannot read property",
                "--inject-fault-renders=2",
                "--log-file=/tmp/beau.log",
                "--log-json",
            ],
            &[],
        );
        assert_eq!(opts.reply_delay_ms, 0);
        assert_eq!(opts.tick_ms, 16);
        assert_eq!(opts.background, 2);
        assert!(!opts.mouse);
        assert_eq!(opts.inject_fault.as_deref(), Some("Cannot read property"));
        assert_eq!(opts.inject_fault_renders, Some(2));
        assert_eq!(opts.log_file, Some(PathBuf::from("/tmp/beau.log")));
        assert!(opts.log_json);
    }

    #[test]
    fn flags_override_env() {
        let env = [("BEAU_REPLY_DELAY_MS", "5"), ("BEAU_BACKGROUND", "midnight_blue")];
        let opts = run(&["--reply-delay-ms=7"], &env);
        assert_eq!(opts.reply_delay_ms, 7);
        assert_eq!(opts.background, 5);
    }

    #[test]
    fn env_overrides_defaults() {
        let env = [
            ("BEAU_TICK_MS", "20"),
            ("BEAU_INJECT_FAULT", "boom"),
            ("BEAU_INJECT_FAULT_RENDERS", "1"),
            ("BEAU_LOG_FILE", "beau.log"),
        ];
        let opts = run(&[], &env);
        assert_eq!(opts.tick_ms, 20);
        assert_eq!(opts.inject_fault.as_deref(), Some("boom"));
        assert_eq!(opts.inject_fault_renders, Some(1));
        assert_eq!(opts.log_file, Some(PathBuf::from("beau.log")));
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(parse(&["--reply-delay-ms=soon"], &[]).is_err());
        assert!(parse(&["--tick-ms=0"], &[]).is_err());
        assert!(parse(&["--background=plaid"], &[]).is_err());
        assert!(parse(&[], &[("BEAU_TICK_MS", "-1")]).is_err());
        assert_eq!(
            parse(&["--frobnicate"], &[]),
            Err("Unknown argument: --frobnicate".to_string())
        );
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse(&["-h"], &[]), Ok(Action::Help));
        assert_eq!(parse(&["--version", "--bogus"], &[]), Ok(Action::Version));
    }

    #[test]
    fn help_text_lists_every_background() {
        for option in theme::BACKGROUNDS {
            assert!(HELP_TEXT.contains(option.id), "{} missing", option.id);
        }
        assert!(!VERSION.is_empty());
    }
}
