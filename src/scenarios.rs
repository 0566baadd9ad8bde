//! Demonstration scenarios with pinned console transcripts
//!
//! Each scenario opens a scope around a body that prints and usually raises,
//! and records what reached the console. The catalog covers both
//! realizations of the protocol:
//!
//! - handler objects ([`ExampleHandler`]) that suppress or propagate
//! - single-suspension procedures ([`example_procedure`] and friends) that
//!   swallow, re-raise, or replace the exception
//!
//! Expected transcripts use `0x000000000000` for traceback addresses; the
//! oracle normalizes observed addresses the same way.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::RunConfig;
use crate::console::Transcript;
use crate::exception::{Exception, ExceptionInfo, ExceptionKind};
use crate::oracle::{EscapedException, Observation};
use crate::procedure::{Handled, ProcedureContext, ScopedProcedure};
use crate::protocol::{with, ContextManager};
use crate::{Error, Result};

/// Message raised by most scenario bodies
pub const VALUE_ERROR_MESSAGE: &str = "ValueError occured.";

/// Message of the exception raised in place of the caught one
pub const RERAISE_MESSAGE: &str = "re-raise";

// Helpers
// ---------------------------------------------------------------------------

/// Handler object that reports every hook on the console
///
/// Entering returns the handler itself. `exit` reports the exception info and
/// answers with the `suppress_exception` flag given at construction.
#[derive(Debug, Clone)]
pub struct ExampleHandler {
    console: Transcript,
    suppress_exception: bool,
}

impl ExampleHandler {
    /// Construct the handler; prints `__init__`
    #[must_use]
    pub fn new(console: &Transcript, suppress_exception: bool) -> Self {
        console.print("__init__");
        Self {
            console: console.clone(),
            suppress_exception,
        }
    }

    /// Whether `exit` suppresses exceptions
    #[must_use]
    pub fn suppress_exception(&self) -> bool {
        self.suppress_exception
    }

    /// Work done inside the scope; prints `run`
    pub fn run(&self) {
        self.console.print("run");
    }
}

impl<'h> ContextManager for &'h ExampleHandler {
    type Target = &'h ExampleHandler;

    fn enter(&mut self) -> Result<&'h ExampleHandler> {
        self.console.print("__enter__");
        Ok(*self)
    }

    fn exit(&mut self, exception: Option<&Exception>) -> Result<bool> {
        self.console
            .print(format_args!("__exit__({})", ExceptionInfo::new(exception)));
        Ok(self.suppress_exception)
    }
}

/// Value handed to the body by the example procedures
#[derive(Debug, Clone)]
pub struct SomeClass {
    console: Transcript,
}

impl SomeClass {
    /// Prints `run`
    pub fn run(&self) {
        self.console.print("run");
    }
}

/// Procedure context with a specific catch region that suppresses and a broad
/// one that logs and re-raises, followed by a cleanup region
///
/// ```text
/// print("Starting")
/// try:
///     yield SomeClass()
/// except ValueError as e:
///     print(e); print("Ignore Exception")
/// except Exception as e:
///     print(e); print("Do not ignore exception"); raise
/// finally:
///     print("Exiting")
/// ```
#[must_use]
pub fn example_procedure(console: &Transcript) -> ProcedureContext<ScopedProcedure<'static, SomeClass>> {
    let setup = console.clone();
    let specific = console.clone();
    let broad = console.clone();
    let cleanup = console.clone();

    ScopedProcedure::new(move || {
        setup.print("Starting");
        Ok(SomeClass { console: setup })
    })
    .except(ExceptionKind::ValueError, move |e| {
        specific.print(e);
        specific.print("Ignore Exception");
        Handled::Suppress
    })
    .except(ExceptionKind::Exception, move |e| {
        broad.print(e);
        broad.print("Do not ignore exception");
        Handled::Reraise
    })
    .finally(move || cleanup.print("Exiting"))
    .named("example_procedure")
    .into_context()
}

/// Procedure context with no catch region: code after the suspension point
/// prints `Resumed`, the cleanup region prints `Exiting`
#[must_use]
pub fn unguarded_procedure(console: &Transcript) -> ProcedureContext<ScopedProcedure<'static, SomeClass>> {
    let setup = console.clone();
    let resumed = console.clone();
    let cleanup = console.clone();

    ScopedProcedure::new(move || {
        setup.print("Starting");
        Ok(SomeClass { console: setup })
    })
    .then(move || {
        resumed.print("Resumed");
        Ok(())
    })
    .finally(move || cleanup.print("Exiting"))
    .named("unguarded_procedure")
    .into_context()
}

/// Procedure context whose broad catch region raises a new exception with
/// message [`RERAISE_MESSAGE`]
#[must_use]
pub fn reraising_procedure(console: &Transcript) -> ProcedureContext<ScopedProcedure<'static, SomeClass>> {
    let setup = console.clone();
    let broad = console.clone();
    let cleanup = console.clone();

    ScopedProcedure::new(move || {
        setup.print("Starting");
        Ok(SomeClass { console: setup })
    })
    .except(ExceptionKind::Exception, move |e| {
        broad.print(e);
        broad.print("Do not ignore exception");
        Handled::Raise(Exception::general(RERAISE_MESSAGE))
    })
    .finally(move || cleanup.print("Exiting"))
    .named("reraising_procedure")
    .into_context()
}

fn raise(exception: Exception) -> std::result::Result<(), Exception> {
    Err(exception)
}

// Scenario bodies
// ---------------------------------------------------------------------------

fn handler_suppresses(console: &Transcript) -> Result<()> {
    console.print("@start with block");
    let handler = ExampleHandler::new(console, true);
    with(&handler, |example| {
        example.run();
        raise(Exception::value_error(VALUE_ERROR_MESSAGE))
    })?;
    console.print("@end with block");
    Ok(())
}

fn handler_after_instantiate(console: &Transcript) -> Result<()> {
    let handler = ExampleHandler::new(console, true);
    console.print("@start with block");
    with(&handler, |example| {
        example.run();
        raise(Exception::value_error(VALUE_ERROR_MESSAGE))
    })?;
    console.print("@end with block");
    Ok(())
}

fn handler_propagates(console: &Transcript) -> Result<()> {
    console.print("@start with block");
    let handler = ExampleHandler::new(console, false);
    with(&handler, |example| {
        example.run();
        raise(Exception::value_error(VALUE_ERROR_MESSAGE))
    })?;
    console.print("@end with block");
    Ok(())
}

fn handler_normal_exit(console: &Transcript) -> Result<()> {
    console.print("@start with block");
    let handler = ExampleHandler::new(console, false);
    with(&handler, |example| {
        example.run();
        Ok(())
    })?;
    console.print("@end with block");
    Ok(())
}

fn procedure_suppresses(console: &Transcript) -> Result<()> {
    console.print("@start with block");
    with(example_procedure(console), |some| {
        some.run();
        raise(Exception::value_error(VALUE_ERROR_MESSAGE))
    })?;
    console.print("@end with block");
    Ok(())
}

fn procedure_unhandled(console: &Transcript) -> Result<()> {
    console.print("@start with block");
    with(unguarded_procedure(console), |some| {
        some.run();
        raise(Exception::general(""))
    })?;
    console.print("@end with block");
    Ok(())
}

fn procedure_reraises(console: &Transcript) -> Result<()> {
    console.print("@start with block");
    with(reraising_procedure(console), |some| {
        some.run();
        raise(Exception::general("original failure"))
    })?;
    console.print("@end with block");
    Ok(())
}

fn procedure_bare_reraise(console: &Transcript) -> Result<()> {
    console.print("@start with block");
    with(example_procedure(console), |some| {
        some.run();
        raise(Exception::type_error("unsupported operand"))
    })?;
    console.print("@end with block");
    Ok(())
}

fn procedure_normal_exit(console: &Transcript) -> Result<()> {
    console.print("@start with block");
    with(example_procedure(console), |some| {
        some.run();
        Ok(())
    })?;
    console.print("@end with block");
    Ok(())
}

// Catalog
// ---------------------------------------------------------------------------

/// A runnable scenario with its pinned observation
pub struct Scenario {
    /// Unique name
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    body: fn(&Transcript) -> Result<()>,
    expected_lines: &'static [&'static str],
    expected_escape: Option<(ExceptionKind, &'static str)>,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("expected_lines", &self.expected_lines.len())
            .finish_non_exhaustive()
    }
}

/// Outcome of running a scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// What was printed and what escaped
    #[serde(flatten)]
    pub observation: Observation,
}

impl Scenario {
    /// Run the scenario on a fresh transcript
    ///
    /// An exception escaping the scenario is recorded in the report rather
    /// than returned.
    ///
    /// # Errors
    ///
    /// Returns an error if a scope violates the protocol
    pub fn run(&self, config: &RunConfig) -> Result<ScenarioReport> {
        let console = Transcript::new();
        console.set_echo(config.echo);

        let escaped = match (self.body)(&console) {
            Ok(()) => None,
            Err(Error::Raised(exc)) => Some(EscapedException::from(&exc)),
            Err(other) => return Err(other),
        };
        debug!(scenario = self.name, lines = console.len(), escaped = escaped.is_some(), "scenario finished");

        Ok(ScenarioReport {
            name: self.name.to_string(),
            observation: Observation {
                lines: console.lines(),
                escaped,
            },
        })
    }

    /// Pinned observation
    #[must_use]
    pub fn expected(&self) -> Observation {
        Observation {
            lines: self
                .expected_lines
                .iter()
                .map(|line| (*line).to_string())
                .collect(),
            escaped: self
                .expected_escape
                .map(|(kind, message)| EscapedException {
                    kind,
                    message: message.to_string(),
                }),
        }
    }
}

const HANDLER_EXIT_VALUE_ERROR: &str =
    "__exit__(<class 'ValueError'>, ValueError occured., <traceback object at 0x000000000000>)";

static CATALOG: [Scenario; 9] = [
    Scenario {
        name: "handler_suppresses",
        description: "Handler object suppresses a ValueError raised in the body",
        body: handler_suppresses,
        expected_lines: &[
            "@start with block",
            "__init__",
            "__enter__",
            "run",
            HANDLER_EXIT_VALUE_ERROR,
            "@end with block",
        ],
        expected_escape: None,
    },
    Scenario {
        name: "handler_after_instantiate",
        description: "Handler constructed before the scope behaves the same",
        body: handler_after_instantiate,
        expected_lines: &[
            "__init__",
            "@start with block",
            "__enter__",
            "run",
            HANDLER_EXIT_VALUE_ERROR,
            "@end with block",
        ],
        expected_escape: None,
    },
    Scenario {
        name: "handler_propagates",
        description: "Handler object lets the ValueError propagate unchanged",
        body: handler_propagates,
        expected_lines: &[
            "@start with block",
            "__init__",
            "__enter__",
            "run",
            HANDLER_EXIT_VALUE_ERROR,
        ],
        expected_escape: Some((ExceptionKind::ValueError, VALUE_ERROR_MESSAGE)),
    },
    Scenario {
        name: "handler_normal_exit",
        description: "Handler object sees an all-absent exception triple",
        body: handler_normal_exit,
        expected_lines: &[
            "@start with block",
            "__init__",
            "__enter__",
            "run",
            "__exit__(None, None, None)",
            "@end with block",
        ],
        expected_escape: None,
    },
    Scenario {
        name: "procedure_suppresses",
        description: "Procedure catches the specific kind and swallows it",
        body: procedure_suppresses,
        expected_lines: &[
            "@start with block",
            "Starting",
            "run",
            VALUE_ERROR_MESSAGE,
            "Ignore Exception",
            "Exiting",
            "@end with block",
        ],
        expected_escape: None,
    },
    Scenario {
        name: "procedure_unhandled",
        description: "Procedure without catch regions: exception escapes, cleanup still runs",
        body: procedure_unhandled,
        expected_lines: &["@start with block", "Starting", "run", "Exiting"],
        expected_escape: Some((ExceptionKind::Exception, "")),
    },
    Scenario {
        name: "procedure_reraises",
        description: "Broad catch region raises a new exception in place of the original",
        body: procedure_reraises,
        expected_lines: &[
            "@start with block",
            "Starting",
            "run",
            "original failure",
            "Do not ignore exception",
            "Exiting",
        ],
        expected_escape: Some((ExceptionKind::Exception, RERAISE_MESSAGE)),
    },
    Scenario {
        name: "procedure_bare_reraise",
        description: "Broad catch region logs and re-raises the caught instance",
        body: procedure_bare_reraise,
        expected_lines: &[
            "@start with block",
            "Starting",
            "run",
            "unsupported operand",
            "Do not ignore exception",
            "Exiting",
        ],
        expected_escape: Some((ExceptionKind::TypeError, "unsupported operand")),
    },
    Scenario {
        name: "procedure_normal_exit",
        description: "Procedure resumes past its suspension point after a clean body",
        body: procedure_normal_exit,
        expected_lines: &[
            "@start with block",
            "Starting",
            "run",
            "Exiting",
            "@end with block",
        ],
        expected_escape: None,
    },
];

/// All scenarios, in presentation order
#[must_use]
pub fn catalog() -> &'static [Scenario] {
    &CATALOG
}

/// Look up a scenario by name
///
/// # Errors
///
/// Returns [`Error::UnknownScenario`] if no scenario has that name
pub fn find(name: &str) -> Result<&'static Scenario> {
    CATALOG
        .iter()
        .find(|scenario| scenario.name == name)
        .ok_or_else(|| Error::UnknownScenario(name.to_string()))
}
