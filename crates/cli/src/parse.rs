//! ArgMatches → CliAction conversion.

use clap::ArgMatches;
use kinesnap::translate::TranslateOptions;
use std::path::PathBuf;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Extract a compressed bundle.
    Extract {
        archive: PathBuf,
        ticket: Option<String>,
    },
    /// Write the snapshot artifact only.
    Translate {
        output: Option<PathBuf>,
        options: TranslateOptions,
    },
    /// Translate, create the cluster and load the snapshot.
    Up { options: TranslateOptions },
    /// Tear the cluster down.
    Down,
    /// Table of pods with captured logs.
    LogList,
    /// Page one pod's log.
    LogView { namespace: String, pod: String },
    /// Verify and summarize an artifact.
    Inspect {
        artifact: PathBuf,
        verify: bool,
        keys: bool,
    },
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, m) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "extract" => Ok(CliAction::Extract {
            archive: required_path(m, "archive")?,
            ticket: m.get_one::<String>("ticket").cloned(),
        }),
        "translate" => Ok(CliAction::Translate {
            output: m.get_one::<PathBuf>("output").cloned(),
            options: translate_options(m),
        }),
        "up" => Ok(CliAction::Up {
            options: translate_options(m),
        }),
        "down" => Ok(CliAction::Down),
        "log" => parse_log(m),
        "inspect" => Ok(CliAction::Inspect {
            artifact: required_path(m, "artifact")?,
            verify: !m.get_flag("no-verify"),
            keys: m.get_flag("keys"),
        }),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn parse_log(m: &ArgMatches) -> Result<CliAction, String> {
    if let Some(("ls", _)) = m.subcommand() {
        return Ok(CliAction::LogList);
    }
    match (m.get_one::<String>("namespace"), m.get_one::<String>("pod")) {
        (Some(namespace), Some(pod)) => Ok(CliAction::LogView {
            namespace: namespace.clone(),
            pod: pod.clone(),
        }),
        (None, None) => Ok(CliAction::LogList),
        _ => Err("Both a namespace and a pod name are required".to_string()),
    }
}

fn translate_options(m: &ArgMatches) -> TranslateOptions {
    let mut options = TranslateOptions::default();
    if let Some(start) = m.get_one::<i64>("start-revision") {
        options = options.start_revision(*start);
    }
    // `up` has no stride flag.
    if let Ok(Some(stride)) = m.try_get_one::<i64>("stride") {
        options = options.stride(*stride);
    }
    options
}

fn required_path(m: &ArgMatches, id: &str) -> Result<PathBuf, String> {
    m.get_one::<PathBuf>(id)
        .cloned()
        .ok_or_else(|| format!("Missing argument: {}", id))
}
