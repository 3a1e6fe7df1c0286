#![forbid(unsafe_code)]

mod config;
mod shell;

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use services::VocabEngine;
use storage::json_file::{JsonSnapshotFile, fallback_word_bank};
use storage::repository::{InMemoryRepository, Storage};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vocab_core::model::{GroupId, QuestionPolicy};

use crate::config::{Config, Overrides};
use crate::shell::Shell;

const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, what: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidPolicy { raw: String },
    UnknownGroup { raw: String },
    ResetNotConfirmed,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command, what } => {
                write!(f, "{command} requires {what}")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidPolicy { raw } => write!(
                f,
                "invalid --type value: {raw} (expected mixed, mc, fill or tf)"
            ),
            ArgsError::UnknownGroup { raw } => write!(f, "no group named {raw:?}"),
            ArgsError::ResetNotConfirmed => {
                write!(f, "reset erases all progress; pass --yes to confirm")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn next_positional(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
    what: &'static str,
) -> Result<String, ArgsError> {
    args.next()
        .ok_or(ArgsError::MissingArgument { command, what })
}

fn parse_number<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  vocab [options] groups");
    eprintln!("  vocab [options] quiz <group> [--type mixed|mc|fill|tf] [--count <n>]");
    eprintln!("  vocab [options] study <group>");
    eprintln!("  vocab [options] match <group>");
    eprintln!("  vocab [options] search <group> <term>");
    eprintln!("  vocab [options] progress");
    eprintln!("  vocab [options] history [--limit <n>]");
    eprintln!("  vocab [options] export <path|->");
    eprintln!("  vocab [options] import <path>");
    eprintln!("  vocab [options] reset --yes");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>     config file (default: ./vocab.toml if present)");
    eprintln!("  --word-bank <path>  word bank JSON (default: built-in sample)");
    eprintln!("  --snapshot <path>   progress file (default: vocab_progress.json)");
    eprintln!("  --seed <n>          fixed random seed");
    eprintln!();
    eprintln!("A group may be given by name (\"Group 1\") or by position (1).");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VOCAB_CONFIG, VOCAB_WORD_BANK, VOCAB_SNAPSHOT, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Groups,
    Quiz {
        group: String,
        policy: Option<QuestionPolicy>,
        count: Option<usize>,
    },
    Study { group: String },
    Match { group: String },
    Search { group: String, term: String },
    Progress,
    History { limit: usize },
    Export { path: String },
    Import { path: PathBuf },
    Reset,
}

impl Command {
    /// True when the command changes progress and the snapshot must be saved afterwards.
    fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Quiz { .. } | Command::Study { .. } | Command::Import { .. } | Command::Reset
        )
    }
}

#[derive(Debug)]
struct Args {
    overrides: Overrides,
    command: Command,
}

impl Args {
    fn parse(argv: impl IntoIterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut args = argv.into_iter();
        let mut overrides = Overrides::default();
        let mut positional = Vec::new();
        let mut policy = None;
        let mut count = None;
        let mut limit = None;
        let mut confirmed = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => overrides.config = Some(require_value(&mut args, "--config")?.into()),
                "--word-bank" => {
                    overrides.word_bank = Some(require_value(&mut args, "--word-bank")?.into());
                }
                "--snapshot" => {
                    overrides.snapshot = Some(require_value(&mut args, "--snapshot")?.into());
                }
                "--seed" => {
                    overrides.seed = Some(parse_number(require_value(&mut args, "--seed")?, "--seed")?);
                }
                "--type" => {
                    let raw = require_value(&mut args, "--type")?;
                    policy = Some(
                        raw.parse::<QuestionPolicy>()
                            .map_err(|_| ArgsError::InvalidPolicy { raw })?,
                    );
                }
                "--count" => {
                    count = Some(parse_number(require_value(&mut args, "--count")?, "--count")?);
                }
                "--limit" => {
                    limit = Some(parse_number(require_value(&mut args, "--limit")?, "--limit")?);
                }
                "--yes" => confirmed = true,
                "--help" | "-h" => return Ok(None),
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let name = positional.next();

        let command = match name.as_deref() {
            None | Some("groups") => Command::Groups,
            Some("quiz") => Command::Quiz {
                group: next_positional(&mut positional, "quiz", "a group")?,
                policy,
                count,
            },
            Some("study") => Command::Study {
                group: next_positional(&mut positional, "study", "a group")?,
            },
            Some("match") => Command::Match {
                group: next_positional(&mut positional, "match", "a group")?,
            },
            Some("search") => {
                let group_name = next_positional(&mut positional, "search", "a group")?;
                let term = positional.collect::<Vec<_>>().join(" ");
                if term.is_empty() {
                    return Err(ArgsError::MissingArgument {
                        command: "search",
                        what: "a term",
                    });
                }
                Command::Search {
                    group: group_name,
                    term,
                }
            }
            Some("progress") => Command::Progress,
            Some("history") => Command::History {
                limit: limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
            },
            Some("export") => Command::Export {
                path: next_positional(&mut positional, "export", "a path")?,
            },
            Some("import") => Command::Import {
                path: next_positional(&mut positional, "import", "a path")?.into(),
            },
            Some("reset") if confirmed => Command::Reset,
            Some("reset") => return Err(ArgsError::ResetNotConfirmed),
            Some(other) => return Err(ArgsError::UnknownCommand(other.to_owned())),
        };

        Ok(Some(Self { overrides, command }))
    }
}

/// Accepts a group name, or its 1-based position in the word bank.
fn resolve_group(engine: &VocabEngine, raw: &str) -> Result<GroupId, ArgsError> {
    let id = GroupId::new(raw);
    if engine.word_bank().group(&id).is_some() {
        return Ok(id);
    }
    raw.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| engine.word_bank().groups().get(i))
        .map(|g| g.id().clone())
        .ok_or_else(|| ArgsError::UnknownGroup { raw: raw.to_owned() })
}

fn init_tracing(fallback_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn open_storage(config: &Config) -> Result<Storage, Box<dyn std::error::Error>> {
    Ok(match &config.word_bank {
        Some(path) => Storage::json_files(path, &config.snapshot),
        None => {
            let repo = InMemoryRepository::new();
            repo.replace_bank(fallback_word_bank()?)?;
            Storage {
                word_bank: Arc::new(repo),
                snapshots: Arc::new(JsonSnapshotFile::new(&config.snapshot)),
            }
        }
    })
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = Args::parse(std::env::args().skip(1)).map_err(|e| {
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    let config = Config::load(&args.overrides)?;
    init_tracing(&config.log_filter);
    if let Some(source) = &config.source {
        tracing::info!(path = %source.display(), "config loaded");
    }

    let storage = open_storage(&config)?;
    let mut engine = VocabEngine::new(storage.word_bank.load_bank()?).with_settings(config.study);
    if let Some(seed) = config.seed {
        engine = engine.with_seed(seed);
    }
    if let Some(json) = storage.snapshots.load_snapshot()? {
        engine.import_json(&json)?;
    }

    let mut out = io::stdout();
    let mut shell = Shell::new(io::stdin().lock(), io::stdout(), config.study.show_hints());

    match &args.command {
        Command::Groups => shell::write_groups(&mut out, &engine)?,
        Command::Quiz {
            group,
            policy,
            count,
        } => {
            let group = resolve_group(&engine, group)?;
            let policy = policy.unwrap_or(config.study.default_policy());
            let count = match count {
                Some(count) => *count,
                None => usize::try_from(config.study.default_question_count())?,
            };
            shell.run_quiz(&mut engine, &group, policy, count)?;
        }
        Command::Study { group } => {
            let group = resolve_group(&engine, group)?;
            shell.run_flashcards(&mut engine, &group)?;
        }
        Command::Match { group } => {
            let group = resolve_group(&engine, group)?;
            shell.run_match(&mut engine, &group)?;
        }
        Command::Search { group, term } => {
            let group = resolve_group(&engine, group)?;
            shell::write_search(&mut out, &engine, &group, term)?;
        }
        Command::Progress => shell::write_progress(&mut out, &engine)?,
        Command::History { limit } => shell::write_history(&mut out, &engine, *limit)?,
        Command::Export { path } => {
            let json = engine.export_json()?;
            if path == "-" {
                writeln!(out, "{json}")?;
            } else {
                std::fs::write(path, json)?;
                writeln!(out, "Progress exported to {path}")?;
            }
        }
        Command::Import { path } => {
            engine.import_json(&std::fs::read_to_string(path)?)?;
            writeln!(out, "Progress imported from {}", path.display())?;
        }
        Command::Reset => {
            engine.reset_all();
            writeln!(out, "All progress has been reset.")?;
        }
    }

    if args.command.mutates() {
        storage.snapshots.save_snapshot(&engine.export_json()?)?;
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        Args::parse(args.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn no_arguments_lists_groups() {
        let args = parse(&[]).unwrap().unwrap();
        assert_eq!(args.command, Command::Groups);
    }

    #[test]
    fn quiz_flags_can_follow_the_group() {
        let args = parse(&["--seed", "5", "quiz", "Group 1", "--type", "tf", "--count", "15"])
            .unwrap()
            .unwrap();
        assert_eq!(args.overrides.seed, Some(5));
        assert_eq!(
            args.command,
            Command::Quiz {
                group: "Group 1".into(),
                policy: Some(QuestionPolicy::TrueFalse),
                count: Some(15),
            }
        );
        assert!(args.command.mutates());
    }

    #[test]
    fn search_joins_remaining_words() {
        let args = parse(&["search", "1", "be", "plentiful"]).unwrap().unwrap();
        assert_eq!(
            args.command,
            Command::Search {
                group: "1".into(),
                term: "be plentiful".into(),
            }
        );
    }

    #[test]
    fn argument_errors() {
        assert!(matches!(parse(&["quiz"]), Err(ArgsError::MissingArgument { .. })));
        assert!(matches!(parse(&["reset"]), Err(ArgsError::ResetNotConfirmed)));
        assert!(matches!(
            parse(&["quiz", "1", "--type", "essay"]),
            Err(ArgsError::InvalidPolicy { .. })
        ));
        assert!(matches!(
            parse(&["history", "--limit", "ten"]),
            Err(ArgsError::InvalidNumber { flag: "--limit", .. })
        ));
        assert!(matches!(parse(&["--verbose"]), Err(ArgsError::UnknownArg(_))));
        assert!(matches!(parse(&["dance"]), Err(ArgsError::UnknownCommand(_))));
        assert!(matches!(parse(&["--seed"]), Err(ArgsError::MissingValue { flag: "--seed" })));
        assert!(parse(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn groups_resolve_by_name_or_position() {
        let engine = VocabEngine::new(fallback_word_bank().unwrap());
        assert_eq!(resolve_group(&engine, "Group 1").unwrap(), GroupId::new("Group 1"));
        assert_eq!(resolve_group(&engine, "1").unwrap(), GroupId::new("Group 1"));
        assert!(matches!(
            resolve_group(&engine, "2"),
            Err(ArgsError::UnknownGroup { .. })
        ));
    }
}
