//! Exception path examples from the procedure chapter

use scopekit::prelude::*;
use scopekit::scenarios::{example_procedure, reraising_procedure, unguarded_procedure};

#[test]
fn test_catch_and_suppress_example() {
    // Example: the specific catch region swallows a ValueError
    let console = Transcript::new();
    console.print("@start with block");
    let outcome: ScopeOutcome<()> = with(example_procedure(&console), |some| {
        some.run();
        Err(Exception::value_error("ValueError occured."))
    })
    .unwrap();
    console.print("@end with block");

    assert!(outcome.is_suppressed());
    assert_eq!(
        console.lines(),
        vec![
            "@start with block",
            "Starting",
            "run",
            "ValueError occured.",
            "Ignore Exception",
            "Exiting",
            "@end with block",
        ]
    );
}

#[test]
fn test_unhandled_exception_example() {
    // Example: without catch regions the same instance escapes, code after
    // the suspension point is skipped, cleanup still runs
    let console = Transcript::new();
    let raised = Exception::general("");
    let result: Result<ScopeOutcome<()>> = with(unguarded_procedure(&console), |some| {
        some.run();
        Err(raised.clone())
    });

    let escaped = result.unwrap_err().into_exception().expect("exception escapes");
    assert!(escaped.is_same(&raised));
    assert_eq!(console.lines(), vec!["Starting", "run", "Exiting"]);
}

#[test]
fn test_reraise_new_exception_example() {
    // Example: the broad catch region raises "re-raise" in place of the original
    let console = Transcript::new();
    let result: Result<ScopeOutcome<()>> = with(reraising_procedure(&console), |some| {
        some.run();
        Err(Exception::general("original failure"))
    });

    let escaped = result.unwrap_err().into_exception().expect("exception escapes");
    assert_eq!(escaped.message(), "re-raise");
    assert_eq!(
        escaped.context().map(Exception::message),
        Some("original failure")
    );
    assert_eq!(
        console.lines(),
        vec![
            "Starting",
            "run",
            "original failure",
            "Do not ignore exception",
            "Exiting",
        ]
    );
}

#[test]
fn test_clean_body_example() {
    let console = Transcript::new();
    let outcome = with(example_procedure(&console), |some| {
        some.run();
        Ok("done")
    })
    .unwrap();
    assert_eq!(outcome.completed(), Some("done"));
    assert_eq!(console.lines(), vec!["Starting", "run", "Exiting"]);
}

#[test]
fn test_fresh_context_per_scope() {
    // Example: the procedure factory builds new suspension state each time
    let console = Transcript::new();
    for _ in 0..2 {
        with(example_procedure(&console), |_| Ok(())).unwrap();
    }
    assert_eq!(
        console.lines(),
        vec!["Starting", "Exiting", "Starting", "Exiting"]
    );
}

#[test]
fn test_code_after_try_statement_example() {
    // Example: code after the whole try statement runs once the exception
    // has been swallowed, after the cleanup region
    let console = Transcript::new();
    let context = ScopedProcedure::new(|| {
        console.print("Starting");
        Ok(())
    })
    .except(ExceptionKind::ValueError, |e| {
        console.print(e);
        Handled::Suppress
    })
    .finally(|| console.print("Exiting"))
    .after(|| {
        console.print("Done");
        Ok(())
    })
    .into_context();

    let outcome: ScopeOutcome<()> =
        with(context, |()| Err(Exception::value_error("ValueError occured."))).unwrap();

    assert!(outcome.is_suppressed());
    assert_eq!(
        console.lines(),
        vec!["Starting", "ValueError occured.", "Exiting", "Done"]
    );
}
