//! kinesnap CLI: replay captured Kubernetes support bundles.
//!
//! - `extract`: unpack a compressed capture into the tickets directory
//! - `translate`: write the snapshot artifact for a bundle
//! - `up` / `down`: seed and tear down a disposable cluster
//! - `log`: list or page captured pod logs
//! - `inspect`: verify and summarize an artifact

mod commands;
mod config;
mod format;
mod parse;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;

use anyhow::{bail, Context, Result};
use kinesnap::cluster::{SystemRunner, KUBECONFIG_HINT};
use kinesnap::durability::ArtifactReader;
use kinesnap::Bundle;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::build_cli;
use config::Settings;
use format::{
    format_error, format_event, format_inspection, format_pod_table, format_translation_summary,
};
use parse::{matches_to_action, CliAction};

fn main() {
    let matches = build_cli().get_matches();
    let settings = Settings::from_matches(&matches);

    init_logging(settings.verbose);
    if !settings.color {
        colored::control::set_override(false);
    }

    let action = match matches_to_action(&matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("(error) {}", e);
            process::exit(2);
        }
    };

    if let Err(e) = run(action, &settings) {
        eprintln!("{}", format_error(&e));
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "kinesnap=debug" } else { "kinesnap=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn run(action: CliAction, settings: &Settings) -> Result<()> {
    debug!(?action, "Running");
    let cwd = std::env::current_dir().context("cannot read the working directory")?;

    match action {
        CliAction::Extract { archive, ticket } => {
            let archive = settings.archive_path(&archive, &cwd);
            let ticket = match ticket {
                Some(ticket) => ticket,
                None => prompt_ticket()?,
            };
            let (bundle, report) = Bundle::extract(settings.tickets_dir()?, &archive, &ticket)
                .with_context(|| format!("failed to extract {}", archive.display()))?;
            for nested in &report.nested {
                println!("Unpacked {}", nested.display());
            }
            println!("Extracted bundle to {}", bundle.root().display());
        }
        CliAction::Translate { output, options } => {
            let bundle = open_bundle(settings, &cwd)?;
            let artifact = output.unwrap_or_else(|| bundle.layout().artifact);
            let (report, _) = bundle
                .translate_to(&artifact, options, &mut print_event)
                .context("translation failed")?;
            println!("{}", format_translation_summary(&report, &artifact));
        }
        CliAction::Up { options } => {
            let bundle = open_bundle(settings, &cwd)?;
            let report = bundle
                .up(&mut SystemRunner, options, &mut print_event)
                .context("failed to bring the cluster up")?;
            println!(
                "{}",
                format_translation_summary(&report.translation, &bundle.layout().artifact)
            );
            println!(
                "k3d cluster created! Please access the cluster with:\n{}",
                KUBECONFIG_HINT
            );
        }
        CliAction::Down => {
            let bundle = open_bundle(settings, &cwd)?;
            let report = bundle
                .down(&mut SystemRunner)
                .context("failed to tear the cluster down")?;
            if !report.cluster_deleted {
                println!("Cluster could not be deleted; check `k3d list`");
            }
            if report.resource_dir_removed {
                println!("Removed {}", bundle.layout().resource_dir.display());
            }
        }
        CliAction::LogList => {
            let index = open_bundle(settings, &cwd)?.pod_logs()?;
            println!("{}", format_pod_table(index.entries()));
        }
        CliAction::LogView { namespace, pod } => {
            let index = open_bundle(settings, &cwd)?.pod_logs()?;
            index
                .page(&mut SystemRunner, &namespace, &pod)
                .with_context(|| format!("cannot show the log of {}/{}", namespace, pod))?;
        }
        CliAction::Inspect {
            artifact,
            verify,
            keys,
        } => inspect(&cwd.join(artifact), verify, keys)?,
    }
    Ok(())
}

fn open_bundle(settings: &Settings, cwd: &Path) -> Result<Bundle> {
    Ok(Bundle::open(settings.bundle_root(cwd)?)?)
}

fn print_event(event: &kinesnap::translate::TranslationEvent) {
    println!("{}", format_event(event));
}

fn inspect(artifact: &Path, verify: bool, keys: bool) -> Result<()> {
    let manifest = ArtifactReader::read_manifest(artifact)?;
    let statements = ArtifactReader::read_statements(artifact, verify)
        .with_context(|| format!("cannot read {}", artifact.display()))?;
    let verified = verify && manifest.is_some();
    println!(
        "{}",
        format_inspection(artifact, manifest.as_ref(), &statements, verified, keys)
    );
    Ok(())
}

fn prompt_ticket() -> Result<String> {
    print!("Enter ticket: -> ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let ticket = line.trim();
    if ticket.is_empty() {
        bail!("Please specify a ticket to continue");
    }
    Ok(ticket.to_string())
}
