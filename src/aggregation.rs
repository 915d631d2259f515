//! Aggregation logic for classifying and counting contributions.
//!
//! Everything a run learns accumulates into one [`AggregateState`]
//! value. The state is created fresh per analysis run and passed
//! explicitly into each classification call; nothing here is global, so
//! several runs (the event window plus the post-event windows) can share
//! one process without leaking counts into each other.
//!
//! Invariants the state maintains:
//!
//! - `all_edits` equals the number of contributions recorded
//! - `all_edits == item_edits + non-item contributions`
//! - the sum of per-kind counts never exceeds `item_edits` (summaries
//!   matching no marker count toward no kind)
//! - every counter only ever grows within a run

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{
    Contribution, EDIT_KIND_ORDER, EditKind, LANGUAGE_MARKERS, LanguageTag, ParticipantIdentity,
};

/// Classify an edit summary into an edit-action kind.
///
/// Markers are tested in [`EDIT_KIND_ORDER`]; the first one contained in
/// the summary wins. Summaries matching no marker (manual edits, actions
/// outside the taxonomy) yield `None`.
pub fn classify_kind(comment: &str) -> Option<EditKind> {
    EDIT_KIND_ORDER
        .iter()
        .find(|kind| comment.contains(kind.marker()))
        .copied()
}

/// Classify an edit summary into a language tag.
///
/// Markers are tested in [`LANGUAGE_MARKERS`] order; no match means
/// [`LanguageTag::Other`].
pub fn classify_language(comment: &str) -> LanguageTag {
    LANGUAGE_MARKERS
        .iter()
        .find(|(marker, _)| comment.contains(marker))
        .map(|(_, tag)| *tag)
        .unwrap_or(LanguageTag::Other)
}

/// Running totals for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AggregateState {
    /// Every contribution processed, item or not.
    pub all_edits: u64,

    /// Contributions that touched a knowledge-base item (`Q` + digits).
    pub item_edits: u64,

    /// Item edits by edit-action kind; kinds never seen are absent.
    pub kind_counts: BTreeMap<EditKind, u64>,

    /// Item edits by language tag of the summary.
    pub language_counts: BTreeMap<LanguageTag, u64>,

    /// Distinct identifiers of every edited item.
    pub edited_items: BTreeSet<String>,

    /// Distinct titles of every edited non-item page.
    pub edited_non_items: BTreeSet<String>,

    /// Edit count per participant, keyed by the literal roster token.
    pub edits_by_participant: BTreeMap<String, u64>,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one contribution into the totals.
    ///
    /// Called once per contribution, in page order. The item/non-item
    /// split drives everything else: kind and language classification
    /// apply to item edits only, while the total and the per-participant
    /// counter grow either way.
    pub fn record(&mut self, contribution: &Contribution, participant: &ParticipantIdentity) {
        if contribution.is_item_edit() {
            self.edited_items.insert(contribution.title.clone());
            self.item_edits += 1;

            if let Some(kind) = classify_kind(&contribution.comment) {
                *self.kind_counts.entry(kind).or_insert(0) += 1;
            }

            let tag = classify_language(&contribution.comment);
            *self.language_counts.entry(tag).or_insert(0) += 1;
        } else {
            self.edited_non_items.insert(contribution.title.clone());
        }

        self.all_edits += 1;
        *self
            .edits_by_participant
            .entry(participant.to_string())
            .or_insert(0) += 1;
    }

    /// Ensure a participant appears in the per-participant tally.
    ///
    /// Participants whose fetch returned no contributions still belong
    /// in the "edits by user" section, with a count of 0. Called once
    /// per roster entry; an existing count is left untouched.
    pub fn register_participant(&mut self, participant: &ParticipantIdentity) {
        self.edits_by_participant
            .entry(participant.to_string())
            .or_insert(0);
    }

    /// Count for one edit-action kind (0 if never seen).
    pub fn kind_count(&self, kind: EditKind) -> u64 {
        self.kind_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Count for one language tag (0 if never seen).
    pub fn language_count(&self, tag: LanguageTag) -> u64 {
        self.language_counts.get(&tag).copied().unwrap_or(0)
    }
}
