//! Verification oracle examples from the book

use scopekit::config::RunConfig;
use scopekit::oracle::{DiffOptions, DifferenceKind, Observation, TranscriptOracle, Verdict};
use scopekit::scenarios;

#[test]
fn test_transcript_oracle_example() {
    // Example: verifying one scenario against its pinned transcript
    let oracle = TranscriptOracle::new();
    let scenario = scenarios::find("handler_suppresses").unwrap();

    let result = oracle.verify(scenario);

    assert!(result.is_ok());
    assert_eq!(result.unwrap().verdict, Verdict::Pass);
}

#[test]
fn test_verify_catalog_example() {
    // Example: verifying the whole catalog
    let oracle = TranscriptOracle::with_config(RunConfig::default().with_diff_options(DiffOptions::strict()));
    let results = oracle.verify_all().unwrap();

    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.verdict.is_pass()));
}

#[test]
fn test_detecting_a_mismatch_example() {
    // Example: a transcript that lost its cleanup line is reported
    let oracle = TranscriptOracle::new();
    let scenario = scenarios::find("procedure_unhandled").unwrap();
    let expected = scenario.expected();
    let tampered = Observation {
        lines: expected.lines[..expected.lines.len() - 1].to_vec(),
        escaped: expected.escaped.clone(),
    };

    match oracle.compare(&expected, &tampered) {
        Verdict::Mismatch { differences } => {
            assert_eq!(differences.len(), 1);
            assert_eq!(differences[0].kind, DifferenceKind::MissingLine);
            assert_eq!(differences[0].expected, "Exiting");
        }
        Verdict::Pass => panic!("tampered transcript must not pass"),
    }
}

#[test]
fn test_escape_mismatch_example() {
    // Example: a different escaped exception fails verification
    let oracle = TranscriptOracle::new();
    let expected = scenarios::find("procedure_reraises").unwrap().expected();
    let swallowed = Observation {
        lines: expected.lines.clone(),
        escaped: None,
    };

    let verdict = oracle.compare(&expected, &swallowed);
    assert!(matches!(
        verdict,
        Verdict::Mismatch { ref differences } if differences[0].kind == DifferenceKind::EscapeMismatch
    ));
}
