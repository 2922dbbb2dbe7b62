//! Terminal output for command results.

use bridge_traits::storage::RemoteDocument;
use chrono::DateTime;
use core_sync::{FileOutcome, FileRecord, SyncReport};
use std::fmt::Write;
use std::path::PathBuf;

pub fn sync_summary(report: &SyncReport) -> String {
    let mut out = String::new();

    for file in &report.files {
        match &file.outcome {
            FileOutcome::Failed { reason } => {
                let _ = writeln!(out, "failed    {}: {}", file.path.display(), reason);
            }
            FileOutcome::Uploaded {
                document_id,
                metadata_applied,
                ..
            } => {
                let note = if *metadata_applied { "" } else { " (untagged)" };
                let _ = writeln!(
                    out,
                    "uploaded  {} -> {}{}",
                    file.path.display(),
                    document_id,
                    note
                );
            }
            FileOutcome::Skipped => {}
        }
    }

    let _ = writeln!(
        out,
        "dataset {}: {} uploaded, {} unchanged, {} failed; parse requested {}/{}",
        report.dataset_id,
        report.uploaded_count(),
        report.skipped_count(),
        report.failed_count(),
        report.parse_triggers_succeeded,
        report.parse_triggers_attempted,
    );
    if report.cancelled {
        out.push_str("cancelled before completion\n");
    }
    out
}

pub fn document_table(documents: &[RemoteDocument]) -> String {
    let mut out = String::new();
    for doc in documents {
        let created = doc
            .created_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let sha1 = doc.metadata.get("sha1").map(String::as_str).unwrap_or("-");
        let _ = writeln!(out, "{}  {}  {}  {}", doc.id, created, sha1, doc.name);
    }
    let _ = writeln!(out, "{} document(s)", documents.len());
    out
}

pub fn status_table(records: &[(PathBuf, FileRecord)]) -> String {
    let mut out = String::new();
    for (path, record) in records {
        let _ = writeln!(
            out,
            "{}  {}  {}",
            record.fingerprint,
            record.remote_document_id.as_deref().unwrap_or("-"),
            path.display()
        );
    }
    let _ = writeln!(out, "{} file(s) tracked", records.len());
    out
}
