//! Data models for Wikitally.
//!
//! The types here mirror the shape of the MediaWiki `usercontribs` API
//! response and carry the two fixed classification taxonomies applied to
//! each contribution: the Wikibase edit-action kind (inferred from the
//! edit summary) and the language tag of the touched term.
//!
//! # Classification order matters
//!
//! Edit summaries routinely contain more than one recognizable marker
//! (a `wbsetclaim-create` summary also mentions the claim language, a
//! `wbsetlabel-add` summary embeds the label text, and so on). Both
//! taxonomies therefore use a **first-match-wins** policy over an
//! explicit ordered marker list. Reordering either list changes which
//! counter a multi-marker summary lands in, so the priority lists live
//! here as visible constants rather than as a branch chain.

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One participant of the event, as listed in the roster file.
///
/// A roster token is either a literal account name or an `IP@<prefix>`
/// marker for participants who edited anonymously; the prefix selects
/// every IP address that starts with it (the API's `ucuserprefix`
/// parameter). The `Display` impl reproduces the roster token verbatim,
/// and the per-participant tally is keyed by that literal string, so two
/// spellings of the same person are tracked separately on purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantIdentity {
    /// A logged-in participant, matched by exact account name.
    User(String),

    /// An anonymous participant, matched by IP-address prefix.
    IpPrefix {
        /// The roster token exactly as supplied; tally map key.
        token: String,

        /// The address prefix after the `IP@` marker; query value.
        prefix: String,
    },
}

impl ParticipantIdentity {
    /// Parse a roster token.
    ///
    /// Tokens containing the `IP@` marker yield the prefix after the
    /// marker (the full token is kept for display and tallying);
    /// everything else is taken verbatim as an account name.
    pub fn parse(token: &str) -> Self {
        match token.split_once("IP@") {
            Some((_, prefix)) => ParticipantIdentity::IpPrefix {
                token: token.to_string(),
                prefix: prefix.to_string(),
            },
            None => ParticipantIdentity::User(token.to_string()),
        }
    }
}

impl Display for ParticipantIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantIdentity::User(name) => write!(f, "{name}"),
            ParticipantIdentity::IpPrefix { token, .. } => write!(f, "{token}"),
        }
    }
}

/// The period of time being analyzed.
///
/// The `usercontribs` listing walks history backwards, so the API's
/// `ucstart` bound is the chronologically *later* end of the window and
/// `ucend` the earlier one. The accessors below hand out the bounds in
/// that reversed order; queries must use them rather than `start`/`end`
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// When the period started (earlier bound).
    pub start: DateTime<Utc>,

    /// When the period ended (later bound).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The `ucstart` query value: the window *end*, API-formatted.
    pub fn uc_start(&self) -> String {
        format_api_timestamp(&self.end)
    }

    /// The `ucend` query value: the window *start*, API-formatted.
    pub fn uc_end(&self) -> String {
        format_api_timestamp(&self.start)
    }
}

/// Format a timestamp the way the MediaWiki API expects it.
fn format_api_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// One edit as reported by the `usercontribs` API.
///
/// Every field defaults: the API freely omits fields (`comment` is
/// suppressed for revision-deleted edits, for example) and a partial
/// record is still worth counting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contribution {
    /// Numeric account id (0 for anonymous edits).
    #[serde(default)]
    pub userid: i64,

    /// Account name or IP address of the editor.
    #[serde(default)]
    pub user: String,

    /// Page id of the edited page.
    #[serde(default)]
    pub pageid: i64,

    /// Revision id created by this edit.
    #[serde(default)]
    pub revid: i64,

    /// Revision id this edit was made on top of (0 for page creation).
    #[serde(default)]
    pub parentid: i64,

    /// Namespace of the edited page.
    #[serde(default)]
    pub ns: i64,

    /// Page title; for knowledge-base items this is the `Q…` identifier.
    #[serde(default)]
    pub title: String,

    /// When the edit was made (API timestamp string).
    #[serde(default)]
    pub timestamp: String,

    /// Edit summary; carries the machine-generated action markers.
    #[serde(default)]
    pub comment: String,

    /// Size of the page in bytes after the edit.
    #[serde(default)]
    pub size: i64,
}

impl Contribution {
    /// Whether this edit touched a knowledge-base item (`Q` + digits).
    ///
    /// Properties (`Property:P…`), help pages and other titles are
    /// non-item edits.
    pub fn is_item_edit(&self) -> bool {
        is_item_title(&self.title)
    }
}

/// An item identifier is `Q` followed by one or more ASCII digits.
pub fn is_item_title(title: &str) -> bool {
    match title.strip_prefix('Q') {
        Some(rest) => !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// The kind of Wikibase edit action, inferred from the edit summary.
///
/// Each kind corresponds to one machine-generated summary marker of the
/// Wikibase API (see <https://www.wikidata.org/w/api.php>). At most one
/// kind is attributed per contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EditKind {
    /// `wbeditentity-create`: a whole new entity was created.
    EntityCreated,
    /// `wbcreateclaim-create`: a claim was created.
    ClaimCreated,
    /// `wbsetclaim-create`: a claim was set for the first time.
    ClaimSet,
    /// `wbsetclaim-update`: an existing claim was updated.
    ClaimUpdated,
    /// `wbsetreference-add`: a reference was added to a claim.
    ReferenceAdded,
    /// `wbsetreference-set`: an existing reference was replaced.
    ReferenceSet,
    /// `wbsetqualifier`: a qualifier was set on a claim.
    QualifierSet,
    /// `wbsetlabel-add`: a label was added in some language.
    LabelAdded,
    /// `wbsetlabel-set`: an existing label was changed.
    LabelSet,
    /// `wbsetdescription-add`: a description was added.
    DescriptionAdded,
    /// `wbsetdescription-set`: an existing description was changed.
    DescriptionSet,
    /// `wbsetdescription-remove`: a description was removed.
    DescriptionRemoved,
    /// `wbsetaliases-add`: aliases were added.
    AliasesAdded,
    /// `wbsetaliases-set`: aliases were replaced.
    AliasesSet,
    /// `wbsetsitelink-add`: a sitelink was added.
    SitelinkAdded,
    /// `wbmergeitems-from`: another item was merged into this one.
    MergedFrom,
    /// `wbremoveclaims-remove`: claims were removed.
    ClaimsRemoved,
    /// `wbremovereferences-remove`: references were removed.
    ReferencesRemoved,
    /// `clientsitelink-update`: a client wiki updated its sitelink.
    ClientSitelinkUpdated,
}

impl EditKind {
    /// The summary substring that identifies this kind.
    pub fn marker(&self) -> &'static str {
        match self {
            EditKind::EntityCreated => "wbeditentity-create",
            EditKind::ClaimCreated => "wbcreateclaim-create",
            EditKind::ClaimSet => "wbsetclaim-create",
            EditKind::ClaimUpdated => "wbsetclaim-update",
            EditKind::ReferenceAdded => "wbsetreference-add",
            EditKind::ReferenceSet => "wbsetreference-set",
            EditKind::QualifierSet => "wbsetqualifier",
            EditKind::LabelAdded => "wbsetlabel-add",
            EditKind::LabelSet => "wbsetlabel-set",
            EditKind::DescriptionAdded => "wbsetdescription-add",
            EditKind::DescriptionSet => "wbsetdescription-set",
            EditKind::DescriptionRemoved => "wbsetdescription-remove",
            EditKind::AliasesAdded => "wbsetaliases-add",
            EditKind::AliasesSet => "wbsetaliases-set",
            EditKind::SitelinkAdded => "wbsetsitelink-add",
            EditKind::MergedFrom => "wbmergeitems-from",
            EditKind::ClaimsRemoved => "wbremoveclaims-remove",
            EditKind::ReferencesRemoved => "wbremovereferences-remove",
            EditKind::ClientSitelinkUpdated => "clientsitelink-update",
        }
    }
}

/// The order in which summary markers are tested.
///
/// First match wins, and several markers can co-occur in one summary, so
/// this order is load-bearing. `ClaimCreated` (`wbcreateclaim-create`)
/// is deliberately tested near the end even though `ClaimSet`
/// (`wbsetclaim-create`) comes second.
pub const EDIT_KIND_ORDER: [EditKind; 19] = [
    EditKind::EntityCreated,
    EditKind::ClaimSet,
    EditKind::ClaimUpdated,
    EditKind::ReferenceAdded,
    EditKind::ReferenceSet,
    EditKind::QualifierSet,
    EditKind::LabelAdded,
    EditKind::LabelSet,
    EditKind::ClaimsRemoved,
    EditKind::ReferencesRemoved,
    EditKind::DescriptionAdded,
    EditKind::DescriptionSet,
    EditKind::AliasesAdded,
    EditKind::AliasesSet,
    EditKind::SitelinkAdded,
    EditKind::MergedFrom,
    EditKind::ClaimCreated,
    EditKind::DescriptionRemoved,
    EditKind::ClientSitelinkUpdated,
];

/// The language a term edit touched, inferred from the edit summary.
///
/// The event this tool was written for was multilingual (Basque,
/// Spanish, English, German, Galician); everything else lands in
/// `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LanguageTag {
    Eu,
    Es,
    En,
    De,
    Gl,
    /// No recognized language marker in the summary.
    Other,
}

impl LanguageTag {
    /// Label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            LanguageTag::Eu => "EU",
            LanguageTag::Es => "ES",
            LanguageTag::En => "EN",
            LanguageTag::De => "DE",
            LanguageTag::Gl => "GL",
            LanguageTag::Other => "nolang/other",
        }
    }
}

/// Ordered `(marker, tag)` pairs for language attribution.
///
/// First match wins; summaries with no marker default to
/// [`LanguageTag::Other`].
pub const LANGUAGE_MARKERS: [(&str, LanguageTag); 5] = [
    ("|en", LanguageTag::En),
    ("|eu", LanguageTag::Eu),
    ("|es", LanguageTag::Es),
    ("|de", LanguageTag::De),
    ("|gl", LanguageTag::Gl),
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_user_identity() {
        let id = ParticipantIdentity::parse("Alice");
        assert_eq!(id, ParticipantIdentity::User("Alice".to_string()));
        assert_eq!(id.to_string(), "Alice");
    }

    #[test]
    fn test_parse_ip_prefix_identity() {
        let id = ParticipantIdentity::parse("IP@158.227.136");
        assert_eq!(
            id,
            ParticipantIdentity::IpPrefix {
                token: "IP@158.227.136".to_string(),
                prefix: "158.227.136".to_string(),
            }
        );
        // Display reproduces the roster token so tallies keep the
        // literal key.
        assert_eq!(id.to_string(), "IP@158.227.136");
    }

    #[test]
    fn test_ip_prefix_token_kept_verbatim() {
        // Text before the marker stays in the tally key; only the part
        // after the marker goes into the query.
        let id = ParticipantIdentity::parse("ehuIP@158.227.136");
        assert_eq!(id.to_string(), "ehuIP@158.227.136");
        match id {
            ParticipantIdentity::IpPrefix { prefix, .. } => assert_eq!(prefix, "158.227.136"),
            other => panic!("expected IpPrefix, got {other:?}"),
        }
    }

    #[test]
    fn test_window_bounds_are_reversed() {
        let start = Utc.with_ymd_and_hms(2015, 7, 3, 7, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2015, 7, 3, 18, 0, 0).unwrap();
        let window = TimeWindow::new(start, end);

        assert_eq!(window.uc_start(), "2015-07-03T18:00:00Z");
        assert_eq!(window.uc_end(), "2015-07-03T07:00:00Z");
    }

    #[test]
    fn test_item_title_matching() {
        assert!(is_item_title("Q42"));
        assert!(is_item_title("Q20640474"));
        assert!(!is_item_title("Property:P276"));
        assert!(!is_item_title("Help:Contents"));
        assert!(!is_item_title("Q"));
        assert!(!is_item_title("Q42b"));
        assert!(!is_item_title(""));
    }

    #[test]
    fn test_contribution_defaults() {
        let raw = serde_json::json!({
            "title": "Q42",
            "comment": "wbsetlabel-add:1|eu"
        });
        let contribution: Contribution = serde_json::from_value(raw).unwrap();

        assert!(contribution.is_item_edit());
        assert_eq!(contribution.userid, 0);
        assert_eq!(contribution.size, 0);
        assert!(contribution.timestamp.is_empty());
    }

    #[test]
    fn test_kind_markers_are_distinct() {
        for (i, a) in EDIT_KIND_ORDER.iter().enumerate() {
            for b in &EDIT_KIND_ORDER[i + 1..] {
                assert_ne!(a.marker(), b.marker());
            }
        }
    }

    #[test]
    fn test_kind_order_covers_every_kind_once() {
        let mut seen = EDIT_KIND_ORDER.to_vec();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), EDIT_KIND_ORDER.len());
    }
}
