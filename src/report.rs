//! Plain-text report writing.
//!
//! A run produces two files: a detail log with one labeled block per
//! contribution, and a global summary enumerating every counter the
//! aggregate tracks. Nothing downstream parses these files, they are
//! read by the event organizers, so the labels only need to be complete
//! and stable within a run.
//!
//! Writes are append-only and best-effort: a failed write is logged and
//! the run carries on. Losing a report line is preferable to abandoning
//! an analysis that already spent hours of polling.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::aggregation::AggregateState;
use crate::model::{
    Contribution, EDIT_KIND_ORDER, LANGUAGE_MARKERS, LanguageTag, ParticipantIdentity,
};

/// An append-only text report file.
pub struct ReportSink {
    path: PathBuf,
}

impl ReportSink {
    /// Point a sink at `path` and truncate it with the run header.
    pub fn create(path: impl AsRef<Path>, header: &str) -> Self {
        let sink = Self {
            path: path.as_ref().to_path_buf(),
        };
        if let Err(e) = std::fs::write(&sink.path, format!("{header}\n")) {
            warn!(path = %sink.path.display(), error = %e, "failed to start report file");
        }
        sink
    }

    /// Append one line, logging (not surfacing) any I/O failure.
    pub fn line(&self, text: &str) {
        let result = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{text}"));

        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "failed to append report line");
        }
    }
}

/// Marker written to the detail log before a participant's fetch starts.
pub fn write_participant_header(sink: &ReportSink, participant: &ParticipantIdentity) {
    sink.line(&format!(
        "********READING CONTRIBUTIONS of *****{participant}***"
    ));
}

/// One labeled block per contribution in the detail log.
pub fn write_contribution_block(sink: &ReportSink, c: &Contribution) {
    sink.line("--- new contribution ---");
    sink.line(&format!("userid: {}", c.userid));
    sink.line(&format!("user name (user): {}", c.user));
    sink.line(&format!("page id: {}", c.pageid));
    sink.line(&format!("rev id: {}", c.revid));
    sink.line(&format!("parent id: {}", c.parentid));
    sink.line(&format!("ns: {}", c.ns));
    sink.line(&format!("title (Item Id): {}", c.title));
    sink.line(&format!("timestamp: {}", c.timestamp));
    sink.line(&format!("comment: {}", c.comment));
    sink.line(&format!("size: {}", c.size));
}

/// Write the global summary: per-participant counts, both identifier
/// sets, then every taxonomy and language counter (zeroes included).
pub fn write_summary(sink: &ReportSink, state: &AggregateState) {
    sink.line("*number of edits by user*");
    for (participant, count) in &state.edits_by_participant {
        sink.line(&format!("****{participant}*{count}***"));
    }

    sink.line("------ list of edited items ------");
    for item in &state.edited_items {
        sink.line(&format!("edited item: {item}"));
    }

    sink.line("------ list of NON WIKIDATA edited items ------");
    for title in &state.edited_non_items {
        sink.line(&format!("non Wikidata edited item: {title}"));
    }

    sink.line(&format!(
        "Number of total Wikidata edits: {}",
        state.item_edits
    ));
    sink.line(&format!("Number of total edits: {}", state.all_edits));
    sink.line(&format!(
        "number of edited items: {}",
        state.edited_items.len()
    ));

    for kind in EDIT_KIND_ORDER {
        sink.line(&format!(
            "number of {} edits: {}",
            kind.marker(),
            state.kind_count(kind)
        ));
    }

    for (_, tag) in LANGUAGE_MARKERS {
        sink.line(&format!(
            "number {} edits: {}",
            tag.label(),
            state.language_count(tag)
        ));
    }
    sink.line(&format!(
        "number {} edits: {}",
        LanguageTag::Other.label(),
        state.language_count(LanguageTag::Other)
    ));
}
