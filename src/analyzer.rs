//! The roster loop: fetch, classify, report.
//!
//! One [`Analysis`] value describes one run (a time window, a roster and
//! the two report paths). Runs are strictly sequential: each participant
//! is fully fetched and folded into the aggregate before the next one
//! starts, so a single mutable [`AggregateState`] is all the shared
//! state there is. An `Analysis` owns no cross-run state; constructing a
//! fresh one per window keeps repeated runs in one process independent.

use std::path::PathBuf;

use tracing::info;

use crate::aggregation::AggregateState;
use crate::data_sources::{ContributionSource, RetryPolicy, fetch_with_retry};
use crate::model::{ParticipantIdentity, TimeWindow};
use crate::report::{
    ReportSink, write_contribution_block, write_participant_header, write_summary,
};

/// Header line of the detail report.
const DETAIL_HEADER: &str = "**** TRACKING THE EDITS DONE BY REGISTERED PARTICIPANTS ****";

/// Header line of the summary report.
const SUMMARY_HEADER: &str = "**** GLOBAL RESULTS OF THE EDITATHON ****";

/// One analysis run over one time window.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The period whose contributions are tallied.
    pub window: TimeWindow,

    /// Participants to poll, in roster order.
    pub roster: Vec<ParticipantIdentity>,

    /// Where the per-contribution detail log goes.
    pub detail_path: PathBuf,

    /// Where the global summary goes.
    pub summary_path: PathBuf,
}

impl Analysis {
    /// Run the analysis: poll every participant, classify every
    /// contribution, write both reports.
    ///
    /// Returns the finalized aggregate so callers can inspect it beyond
    /// the written reports. Only a bounded retry policy can make this
    /// fail; with the default policy a dead endpoint stalls the run
    /// instead.
    pub async fn run<S: ContributionSource>(
        &self,
        source: &S,
        policy: &RetryPolicy,
    ) -> anyhow::Result<AggregateState> {
        let detail = ReportSink::create(&self.detail_path, DETAIL_HEADER);
        let summary = ReportSink::create(&self.summary_path, SUMMARY_HEADER);

        let mut state = AggregateState::new();

        for participant in &self.roster {
            write_participant_header(&detail, participant);

            let contributions =
                fetch_with_retry(source, participant, &self.window, policy).await?;

            info!(
                participant = %participant,
                contributions = contributions.len(),
                "processing participant"
            );

            for contribution in &contributions {
                write_contribution_block(&detail, contribution);
                state.record(contribution, participant);
            }

            // Every roster entry gets a per-user row, zero edits or not.
            state.register_participant(participant);
        }

        write_summary(&summary, &state);

        info!(
            all_edits = state.all_edits,
            item_edits = state.item_edits,
            participants = self.roster.len(),
            "analysis run finished"
        );

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::data_sources::FetchError;
    use crate::model::Contribution;

    /// Source serving canned pages keyed by participant token.
    struct CannedSource {
        pages: HashMap<String, Vec<Contribution>>,
    }

    impl ContributionSource for CannedSource {
        async fn fetch_page(
            &self,
            identity: &ParticipantIdentity,
            _window: &TimeWindow,
        ) -> Result<Vec<Contribution>, FetchError> {
            Ok(self
                .pages
                .get(&identity.to_string())
                .cloned()
                .unwrap_or_default())
        }
    }

    fn contribution(title: &str, comment: &str) -> Contribution {
        Contribution {
            title: title.to_string(),
            comment: comment.to_string(),
            ..Default::default()
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("wikitally-run-{}-{name}.txt", std::process::id()))
    }

    #[tokio::test]
    async fn test_full_run_over_two_participants() {
        let mut pages = HashMap::new();
        pages.insert(
            "Alice".to_string(),
            vec![contribution("Q42", "wbeditentity-create|en")],
        );
        pages.insert(
            "IP@158.227.136".to_string(),
            vec![
                contribution("Q42", "wbsetlabel-add|es"),
                contribution("Property:P276", "edit"),
            ],
        );
        let source = CannedSource { pages };

        let analysis = Analysis {
            window: TimeWindow::new(
                Utc.with_ymd_and_hms(2015, 7, 3, 7, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2015, 7, 3, 18, 0, 0).unwrap(),
            ),
            roster: vec![
                ParticipantIdentity::parse("Alice"),
                ParticipantIdentity::parse("IP@158.227.136"),
            ],
            detail_path: temp_path("detail"),
            summary_path: temp_path("summary"),
        };

        let state = analysis
            .run(&source, &RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(state.all_edits, 3);
        assert_eq!(state.item_edits, 2);
        assert!(state.edited_items.contains("Q42"));
        assert!(state.edited_non_items.contains("Property:P276"));
        assert_eq!(state.edits_by_participant["Alice"], 1);
        assert_eq!(state.edits_by_participant["IP@158.227.136"], 2);

        let detail = std::fs::read_to_string(&analysis.detail_path).unwrap();
        assert!(detail.starts_with(DETAIL_HEADER));
        assert!(detail.contains("READING CONTRIBUTIONS of *****Alice***"));
        assert!(detail.contains("READING CONTRIBUTIONS of *****IP@158.227.136***"));
        assert_eq!(detail.matches("--- new contribution ---").count(), 3);

        let summary = std::fs::read_to_string(&analysis.summary_path).unwrap();
        assert!(summary.starts_with(SUMMARY_HEADER));
        assert!(summary.contains("****Alice*1***"));
        assert!(summary.contains("Number of total edits: 3"));

        std::fs::remove_file(&analysis.detail_path).ok();
        std::fs::remove_file(&analysis.summary_path).ok();
    }

    #[tokio::test]
    async fn test_runs_share_no_state() {
        let mut pages = HashMap::new();
        pages.insert(
            "Alice".to_string(),
            vec![contribution("Q1", "wbsetlabel-add|eu")],
        );
        let source = CannedSource { pages };

        let analysis = Analysis {
            window: TimeWindow::new(
                Utc.with_ymd_and_hms(2015, 7, 3, 7, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2015, 7, 3, 18, 0, 0).unwrap(),
            ),
            roster: vec![ParticipantIdentity::parse("Alice")],
            detail_path: temp_path("leak-detail"),
            summary_path: temp_path("leak-summary"),
        };

        let first = analysis.run(&source, &RetryPolicy::default()).await.unwrap();
        let second = analysis.run(&source, &RetryPolicy::default()).await.unwrap();

        // The second run starts from zero, not from the first run's totals.
        assert_eq!(first.all_edits, 1);
        assert_eq!(second.all_edits, 1);

        std::fs::remove_file(&analysis.detail_path).ok();
        std::fs::remove_file(&analysis.summary_path).ok();
    }
}
