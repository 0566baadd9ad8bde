//! Suppression examples from the handler object chapter

use scopekit::oracle::normalize_addresses;
use scopekit::protocol::{with, ScopeOutcome};
use scopekit::scenarios::ExampleHandler;
use scopekit::{Error, Exception, ExceptionKind, Result, Transcript};

#[test]
fn test_suppressing_handler_example() {
    // Example: a handler constructed with suppress = true swallows the error
    let console = Transcript::new();
    console.print("@start with block");

    let handler = ExampleHandler::new(&console, true);
    let outcome: ScopeOutcome<()> = with(&handler, |example| {
        example.run();
        Err(Exception::value_error("ValueError occured."))
    })
    .expect("exception is suppressed");

    console.print("@end with block");

    assert!(outcome.is_suppressed());
    let lines: Vec<String> = console.lines().iter().map(|l| normalize_addresses(l)).collect();
    assert_eq!(
        lines,
        vec![
            "@start with block",
            "__init__",
            "__enter__",
            "run",
            "__exit__(<class 'ValueError'>, ValueError occured., <traceback object at 0x000000000000>)",
            "@end with block",
        ]
    );
}

#[test]
fn test_propagating_handler_example() {
    // Example: suppress = false lets the very same exception escape
    let console = Transcript::new();
    let handler = ExampleHandler::new(&console, false);
    let raised = Exception::value_error("ValueError occured.");

    let result: Result<ScopeOutcome<()>> = with(&handler, |_| Err(raised.clone()));

    match result {
        Err(Error::Raised(escaped)) => {
            assert!(escaped.is_same(&raised));
            assert_eq!(escaped.kind(), ExceptionKind::ValueError);
        }
        other => panic!("expected the exception to escape, got {other:?}"),
    }
    assert!(console
        .lines()
        .last()
        .is_some_and(|l| l.starts_with("__exit__(<class 'ValueError'>")));
}

#[test]
fn test_suppressed_exception_is_inspectable() {
    // Example: the suppressed exception is handed back in the outcome
    let console = Transcript::new();
    let handler = ExampleHandler::new(&console, true);
    let raised = Exception::type_error("wrong type");

    let outcome: ScopeOutcome<()> = with(&handler, |_| Err(raised.clone())).unwrap();

    let suppressed = outcome.suppressed().expect("suppressed exception");
    assert!(suppressed.is_same(&raised));
    assert_eq!(suppressed.repr(), "TypeError('wrong type')");
}
