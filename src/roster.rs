//! Participant roster loading.

use std::path::Path;

use anyhow::Context;

use crate::model::ParticipantIdentity;

/// Read the roster file: one identity token per line, blank lines
/// skipped, order and duplicates preserved.
pub fn load_roster(path: impl AsRef<Path>) -> anyhow::Result<Vec<ParticipantIdentity>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading roster file {}", path.display()))?;

    Ok(parse_roster(&content))
}

/// Parse roster file content into identities.
pub fn parse_roster(content: &str) -> Vec<ParticipantIdentity> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ParticipantIdentity::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roster_mixed_tokens() {
        let roster = parse_roster("Alice\n\nIP@158.227.136\nBob\n");

        assert_eq!(
            roster,
            vec![
                ParticipantIdentity::User("Alice".to_string()),
                ParticipantIdentity::IpPrefix {
                    token: "IP@158.227.136".to_string(),
                    prefix: "158.227.136".to_string(),
                },
                ParticipantIdentity::User("Bob".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_roster_keeps_duplicates_and_order() {
        let roster = parse_roster("Bob\nAlice\nBob");

        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0], roster[2]);
    }

    #[test]
    fn test_load_roster_missing_file_errors() {
        let err = load_roster("/nonexistent/roster.txt").unwrap_err();
        assert!(err.to_string().contains("roster"));
    }
}
