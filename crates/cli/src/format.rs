//! Operator-facing output.

use colored::Colorize;
use kinesnap::cluster::PodLogEntry;
use kinesnap::durability::{ArtifactManifest, Statement};
use kinesnap::translate::{TranslationEvent, TranslationReport};
use std::path::Path;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One line per translation event: green when records were written,
/// yellow otherwise.
pub fn format_event(event: &TranslationEvent) -> String {
    match event {
        TranslationEvent::Translated {
            path,
            resource,
            count,
        } => format!(
            "Writing {} {} resources from file: {}",
            count,
            resource,
            file_name(path)
        )
        .green()
        .to_string(),
        TranslationEvent::SkippedEmpty { path, resource } => format!(
            "Skipping empty {} resource file: {}",
            resource,
            file_name(path)
        )
        .yellow()
        .to_string(),
        TranslationEvent::Excluded { path, kind } => format!(
            "Skipping excluded {} resource file: {}",
            kind,
            file_name(path)
        )
        .yellow()
        .to_string(),
    }
}

/// Totals after a translation.
pub fn format_translation_summary(report: &TranslationReport, artifact: &Path) -> String {
    let mut out = format!(
        "Wrote {} records from {} files to {}",
        report.records_written,
        report.files_translated(),
        artifact.display()
    );
    if let (Some(first), Some(last)) = (report.first_id, report.last_id) {
        out.push_str(&format!(" (ids {}..={})", first, last));
    }
    out
}

/// Pod log listing, tab separated with a header row.
pub fn format_pod_table(entries: &[PodLogEntry]) -> String {
    let mut out = String::from("NAMESPACE\tNAME");
    for entry in entries {
        out.push('\n');
        out.push_str(&entry.namespace);
        out.push('\t');
        out.push_str(&entry.pod);
    }
    out
}

/// Artifact summary for `inspect`.
pub fn format_inspection(
    artifact: &Path,
    manifest: Option<&ArtifactManifest>,
    statements: &[Statement],
    verified: bool,
    keys: bool,
) -> String {
    let mut lines = vec![format!("artifact: {}", artifact.display())];
    lines.push(format!("records:  {}", statements.len()));
    if let (Some(first), Some(last)) = (statements.first(), statements.last()) {
        lines.push(format!("ids:      {}..={}", first.record.id, last.record.id));
    }
    match manifest {
        Some(m) if verified => {
            lines.push(format!("checksum: {} {}", m.checksum, "(verified)".green()));
            lines.push(format!("created:  {}", m.created_at));
        }
        Some(m) => {
            lines.push(format!("checksum: {} {}", m.checksum, "(not verified)".yellow()));
            lines.push(format!("created:  {}", m.created_at));
        }
        None => lines.push(format!("checksum: {}", "no manifest".yellow())),
    }
    if keys {
        for statement in statements {
            lines.push(format!("{}\t{}", statement.record.id, statement.record.key));
        }
    }
    lines.join("\n")
}

/// Error line for stderr.
pub fn format_error(err: &anyhow::Error) -> String {
    format!("{} {:#}", "error:".red().bold(), err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_event() {
        plain();
        let event = TranslationEvent::Translated {
            path: PathBuf::from("/b/api-resources/pods.yaml"),
            resource: "pods".to_string(),
            count: 3,
        };
        assert_eq!(format_event(&event), "Writing 3 pods resources from file: pods.yaml");

        let event = TranslationEvent::SkippedEmpty {
            path: PathBuf::from("/b/api-resources/nodes.yaml"),
            resource: "minions".to_string(),
        };
        assert_eq!(
            format_event(&event),
            "Skipping empty minions resource file: nodes.yaml"
        );

        let event = TranslationEvent::Excluded {
            path: PathBuf::from("/b/api-resources/secrets.yaml"),
            kind: "secrets".to_string(),
        };
        assert_eq!(
            format_event(&event),
            "Skipping excluded secrets resource file: secrets.yaml"
        );
    }

    #[test]
    fn test_format_pod_table() {
        let entries = vec![
            PodLogEntry {
                namespace: "default".to_string(),
                pod: "web-1".to_string(),
                path: PathBuf::from("/b/pods_logs/default_web-1.log"),
            },
            PodLogEntry {
                namespace: "kube-system".to_string(),
                pod: "coredns-1".to_string(),
                path: PathBuf::from("/b/pods_logs/kube-system_coredns-1.log"),
            },
        ];
        assert_eq!(
            format_pod_table(&entries),
            "NAMESPACE\tNAME\ndefault\tweb-1\nkube-system\tcoredns-1"
        );
        assert_eq!(format_pod_table(&[]), "NAMESPACE\tNAME");
    }

    #[test]
    fn test_format_error_chain() {
        plain();
        let err = anyhow::anyhow!("inner").context("outer");
        assert_eq!(format_error(&err), "error: outer: inner");
    }
}
