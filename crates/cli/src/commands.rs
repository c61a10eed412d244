//! clap command tree.

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

/// Build the full command tree.
pub fn build_cli() -> Command {
    Command::new("kinesnap")
        .about("Replay captured Kubernetes support bundles into a disposable cluster")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("bundle")
                .long("bundle")
                .short('b')
                .global(true)
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Bundle root (default: the bundle-* directory containing the working directory)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging"),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Disable colored output"),
        )
        .subcommand(extract_cmd())
        .subcommand(translate_cmd())
        .subcommand(up_cmd())
        .subcommand(Command::new("down").about("Delete the cluster and the bundle's working directory"))
        .subcommand(log_cmd())
        .subcommand(inspect_cmd())
}

fn start_revision_arg() -> Arg {
    Arg::new("start-revision")
        .long("start-revision")
        .value_name("N")
        .value_parser(value_parser!(i64))
        .help("Id of the first record")
}

fn extract_cmd() -> Command {
    Command::new("extract")
        .about("Extract a compressed support bundle into the tickets directory")
        .arg(
            Arg::new("archive")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("gzip-compressed bundle"),
        )
        .arg(
            Arg::new("ticket")
                .long("ticket")
                .short('t')
                .help("Ticket the bundle belongs to (prompted for when absent)"),
        )
}

fn translate_cmd() -> Command {
    Command::new("translate")
        .about("Translate the bundle's resources into a snapshot artifact")
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Artifact path (default: <bundle>/.kinesnap/snapshot.sql)"),
        )
        .arg(start_revision_arg())
        .arg(
            Arg::new("stride")
                .long("stride")
                .value_name("N")
                .value_parser(value_parser!(i64))
                .help("Distance between consecutive record ids"),
        )
}

fn up_cmd() -> Command {
    Command::new("up")
        .about("Create a cluster seeded with the bundle's resources")
        .arg(start_revision_arg())
}

fn log_cmd() -> Command {
    Command::new("log")
        .visible_alias("logs")
        .about("List or view captured pod logs")
        .args_conflicts_with_subcommands(true)
        .subcommand(
            Command::new("ls")
                .visible_alias("list")
                .about("List pods with captured logs"),
        )
        .arg(
            Arg::new("namespace")
                .requires("pod")
                .help("Pod namespace"),
        )
        .arg(Arg::new("pod").requires("namespace").help("Pod name"))
}

fn inspect_cmd() -> Command {
    Command::new("inspect")
        .about("Verify and summarize a snapshot artifact")
        .arg(
            Arg::new("artifact")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("no-verify")
                .long("no-verify")
                .action(ArgAction::SetTrue)
                .help("Skip the manifest checksum"),
        )
        .arg(
            Arg::new("keys")
                .long("keys")
                .action(ArgAction::SetTrue)
                .help("List every record's id and key"),
        )
}
