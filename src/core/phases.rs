// src/core/phases.rs

use crate::models::{ExecutionPhase, LinkSpec, Phase};
use thiserror::Error;

/// A setup or test selector that could not be turned into a `LinkSpec`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {phase} link #{position} '{raw}': {reason}")]
pub struct LinkParseError {
    pub phase: Phase,
    /// 1-based position of the selector within its phase.
    pub position: usize,
    pub raw: String,
    pub reason: String,
}

fn parse_links(phase: Phase, raw_links: &[String]) -> Result<Vec<LinkSpec>, LinkParseError> {
    raw_links
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            raw.parse::<LinkSpec>().map_err(|e| LinkParseError {
                phase,
                position: i + 1,
                raw: raw.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Groups raw selectors into execution phases: Setup first, then Test.
/// A phase whose raw list is empty is omitted, so the result holds zero, one or two phases.
pub fn sequence(
    setup_raw: &[String],
    test_raw: &[String],
) -> Result<Vec<ExecutionPhase>, LinkParseError> {
    let mut phases = Vec::with_capacity(2);

    for (phase, raw_links) in [(Phase::Setup, setup_raw), (Phase::Test, test_raw)] {
        if raw_links.is_empty() {
            continue;
        }
        phases.push(ExecutionPhase {
            phase,
            links: parse_links(phase, raw_links)?,
        });
    }

    log::debug!("Sequenced phases: {:?}", phases);
    Ok(phases)
}

/// Total number of links across all phases. Used for `i/n` progress and last-link detection.
pub fn total_links(phases: &[ExecutionPhase]) -> usize {
    phases.iter().map(|p| p.links.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_only_test_links_gives_single_test_phase() {
        let phases = sequence(&[], &strings(&["smoke"])).unwrap();
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].phase, Phase::Test);
        assert_eq!(phases[0].links, vec![LinkSpec::parse("smoke")]);
    }

    #[test]
    fn test_setup_precedes_test() {
        let phases = sequence(
            &strings(&["db.Init", "auth.Login"]),
            &strings(&["api_tests"]),
        )
        .unwrap();
        let kinds: Vec<Phase> = phases.iter().map(|p| p.phase).collect();
        assert_eq!(kinds, vec![Phase::Setup, Phase::Test]);
        assert_eq!(phases[0].links[0].collection, "db");
        assert_eq!(phases[0].links[1].items, vec!["Login"]);
        assert_eq!(total_links(&phases), 3);
    }

    #[test]
    fn test_no_links_gives_no_phases() {
        assert!(sequence(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_link_parse_error_names_phase_and_value() {
        let err = LinkParseError {
            phase: Phase::Setup,
            position: 2,
            raw: "\"broken".to_string(),
            reason: "unbalanced quotes".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid setup link #2 '\"broken': unbalanced quotes"
        );
    }
}
