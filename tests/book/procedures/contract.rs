//! Single-suspension contract examples from the procedure chapter

use scopekit::prelude::*;

/// Hand-written procedure: a counter that suspends `limit` times
struct Ticker {
    ticks: u32,
    limit: u32,
}

impl Procedure for Ticker {
    type Yield = u32;

    fn resume(&mut self, input: Resume) -> Step<u32> {
        if let Resume::Throw(exc) = input {
            return Step::Raise(exc);
        }
        if self.ticks < self.limit {
            self.ticks += 1;
            Step::Yield(self.ticks)
        } else {
            Step::Complete
        }
    }

    fn name(&self) -> &str {
        "ticker"
    }
}

fn ticker(limit: u32) -> ProcedureContext<Ticker> {
    contextmanager(Ticker { ticks: 0, limit })
}

#[test]
fn test_hand_written_procedure_example() {
    let outcome = with(ticker(1), |tick| Ok(tick * 100)).unwrap();
    assert_eq!(outcome.completed(), Some(100));
}

#[test]
fn test_never_suspending_procedure_fails_at_entry() {
    let mut body_ran = false;
    let result = with(ticker(0), |_| {
        body_ran = true;
        Ok(())
    });
    assert!(matches!(result, Err(Error::Configuration { .. })));
    assert!(!body_ran);
}

#[test]
fn test_suspending_twice_fails_at_exit() {
    let result = with(ticker(2), |_| Ok(()));
    match result {
        Err(Error::Configuration { message, .. }) => assert!(message.contains("more than once")),
        other => panic!("expected a configuration error, got {other:?}"),
    }
}

#[test]
fn test_rethrowing_procedure_propagates_original() {
    let raised = Exception::value_error("x");
    let result: Result<ScopeOutcome<()>> = with(ticker(1), |_| Err(raised.clone()));
    let escaped = result.unwrap_err().into_exception().unwrap();
    assert!(escaped.is_same(&raised));
    assert!(escaped.context().is_none());
}

#[test]
fn test_context_is_single_use() {
    let mut context = ticker(1);
    with(&mut context, |_| Ok(())).unwrap();
    assert_eq!(context.state(), SuspensionState::Resumed);
    assert!(with(&mut context, |_| Ok(())).unwrap_err().is_configuration());
}
