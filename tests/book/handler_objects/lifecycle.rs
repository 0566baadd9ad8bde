//! Lifecycle examples from the handler object chapter

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use scopekit::protocol::{with, ContextManager, ScopeOutcome};
use scopekit::scenarios::ExampleHandler;
use scopekit::{Exception, Result, Transcript};

/// A handler that hands out a connection name and counts its hooks
struct Connection {
    host: String,
    opened: Cell<usize>,
    closed: Cell<usize>,
}

impl<'c> ContextManager for &'c Connection {
    type Target = &'c str;

    fn enter(&mut self) -> Result<&'c str> {
        let conn: &'c Connection = *self;
        conn.opened.set(conn.opened.get() + 1);
        Ok(conn.host.as_str())
    }

    fn exit(&mut self, _exception: Option<&Exception>) -> Result<bool> {
        self.closed.set(self.closed.get() + 1);
        Ok(false)
    }
}

fn connection() -> Connection {
    Connection {
        host: "localhost".to_string(),
        opened: Cell::new(0),
        closed: Cell::new(0),
    }
}

#[test]
fn test_enter_value_is_bound() {
    let conn = connection();
    let outcome = with(&conn, |host| Ok(format!("Result from {host}"))).unwrap();
    assert_eq!(outcome.completed().as_deref(), Some("Result from localhost"));
}

#[test]
fn test_exit_runs_once_on_every_path() {
    let conn = connection();

    // normal completion
    with(&conn, |_| Ok(())).unwrap();
    // raised exception
    let _: Result<ScopeOutcome<()>> = with(&conn, |_| Err(Exception::general("boom")));
    // early return
    with(&conn, |host| {
        if host.is_empty() {
            return Ok(0);
        }
        Ok(1)
    })
    .unwrap();
    // panic
    let _ = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = with(&conn, |_| -> std::result::Result<(), Exception> { panic!("bug") });
    }));

    assert_eq!(conn.opened.get(), 4);
    assert_eq!(conn.closed.get(), 4);
}

#[test]
fn test_normal_exit_reports_absent_info() {
    let console = Transcript::new();
    let handler = ExampleHandler::new(&console, true);
    with(&handler, |example| {
        example.run();
        Ok(())
    })
    .unwrap();
    assert_eq!(
        console.lines(),
        vec!["__init__", "__enter__", "run", "__exit__(None, None, None)"]
    );
}

#[test]
fn test_identical_handlers_print_identical_text() {
    let run = || {
        let console = Transcript::new();
        let handler = ExampleHandler::new(&console, true);
        let _: ScopeOutcome<()> =
            with(&handler, |_| Err(Exception::value_error("x"))).unwrap();
        console
            .lines()
            .iter()
            .map(|l| scopekit::oracle::normalize_addresses(l))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
