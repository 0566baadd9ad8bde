//! Basic Scope Example
//!
//! Demonstrates handler objects and single-suspension procedures.
//!
//! Run with: cargo run --example scope_basic

use scopekit::prelude::*;
use scopekit::scenarios::{example_procedure, reraising_procedure};

fn main() {
    println!("=== scopekit Scope Example ===\n");

    // Handler objects: suppress, then propagate
    println!("--- Handler objects ---");
    for suppress in [true, false] {
        let console = Transcript::echoing();
        let handler = ExampleHandler::new(&console, suppress);
        let result: Result<ScopeOutcome<()>> = with(&handler, |example| {
            example.run();
            Err(Exception::value_error("ValueError occured."))
        });
        match result {
            Ok(outcome) => println!("  suppressed: {}", outcome.is_suppressed()),
            Err(e) => println!("  escaped: {e}"),
        }
        println!();
    }

    // Procedures: the ValueError region swallows, the broad region replaces
    println!("--- Procedures ---");
    let console = Transcript::echoing();
    let outcome: Result<ScopeOutcome<()>> = with(example_procedure(&console), |some| {
        some.run();
        Err(Exception::value_error("ValueError occured."))
    });
    println!("  suppressed: {}", outcome.map(|o| o.is_suppressed()).unwrap_or(false));
    println!();

    let result: Result<ScopeOutcome<()>> = with(reraising_procedure(&console), |some| {
        some.run();
        Err(Exception::general("original failure"))
    });
    if let Err(e) = result {
        println!("  escaped: {e}");
        if let Some(original) = e.exception().and_then(Exception::context) {
            println!("  while handling: {original}");
        }
    }
    println!();

    // Verify the pinned transcripts
    println!("--- Verification ---");
    let oracle = TranscriptOracle::new();
    match oracle.verify_all() {
        Ok(results) => {
            for result in results {
                let status = if result.verdict.is_pass() { "PASS" } else { "FAIL" };
                println!("  {status}  {}", result.scenario);
            }
        }
        Err(e) => println!("  error - {e}"),
    }

    println!("\n=== Example Complete ===");
}
