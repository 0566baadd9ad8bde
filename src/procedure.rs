//! Suspendable procedures as scope managers
//!
//! A [`Procedure`] runs setup code, suspends once handing a value to the scope
//! body, and is resumed when the scope ends. [`ProcedureContext`] drives it
//! through `NotStarted → Suspended → Resumed` and enforces the
//! single-suspension contract:
//!
//! | Situation                         | Result                         |
//! |-----------------------------------|--------------------------------|
//! | completes without suspending      | configuration error at entry   |
//! | suspends again on resume          | configuration error at exit    |
//! | context entered a second time     | configuration error at entry   |
//!
//! [`ScopedProcedure`] builds a procedure from closures: setup, code after
//! the suspension point, catch regions, and a cleanup region. Its shape makes
//! the single suspension structural.
//!
//! # Example
//!
//! ```rust
//! use scopekit::procedure::{Handled, ScopedProcedure};
//! use scopekit::protocol::{with, ScopeOutcome};
//! use scopekit::{Exception, ExceptionKind, Transcript};
//!
//! let console = Transcript::new();
//! let context = ScopedProcedure::new(|| {
//!     console.print("Starting");
//!     Ok(42)
//! })
//! .except(ExceptionKind::ValueError, |e| {
//!     console.print(e);
//!     Handled::Suppress
//! })
//! .finally(|| console.print("Exiting"))
//! .into_context();
//!
//! let outcome: ScopeOutcome<()> = with(context, |_answer| Err(Exception::value_error("bad")))?;
//! assert!(outcome.is_suppressed());
//! assert_eq!(console.lines(), vec!["Starting", "bad", "Exiting"]);
//! # Ok::<(), scopekit::Error>(())
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::exception::{Exception, ExceptionKind};
use crate::protocol::ContextManager;
use crate::{Error, Result};

/// Signal delivered to a procedure when it is resumed
#[derive(Debug, Clone)]
pub enum Resume {
    /// Continue normally
    Next,
    /// Raise the exception at the suspension point
    Throw(Exception),
}

/// What a procedure did after being resumed
#[derive(Debug, Clone)]
pub enum Step<T> {
    /// Suspended, handing out a value
    Yield(T),
    /// Ran to completion
    Complete,
    /// Finished by raising
    Raise(Exception),
}

/// A procedure with suspension points
pub trait Procedure {
    /// Value handed out at a suspension point
    type Yield;

    /// Run until the next suspension point or the end
    fn resume(&mut self, input: Resume) -> Step<Self::Yield>;

    /// Name used in diagnostics
    fn name(&self) -> &str {
        "procedure"
    }
}

/// Lifecycle of a procedure-backed scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuspensionState {
    /// Not yet entered
    NotStarted,
    /// Suspended while the scope body runs
    Suspended,
    /// Resumed past the suspension point (terminal)
    Resumed,
}

impl fmt::Display for SuspensionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not-started"),
            Self::Suspended => write!(f, "suspended"),
            Self::Resumed => write!(f, "resumed"),
        }
    }
}

/// Scope manager driving a [`Procedure`]
pub struct ProcedureContext<P> {
    procedure: P,
    state: SuspensionState,
}

/// Wrap a procedure so it can manage one scope
#[must_use]
pub fn contextmanager<P: Procedure>(procedure: P) -> ProcedureContext<P> {
    ProcedureContext::new(procedure)
}

impl<P: Procedure> ProcedureContext<P> {
    /// Create a context in the `NotStarted` state
    #[must_use]
    pub fn new(procedure: P) -> Self {
        Self {
            procedure,
            state: SuspensionState::NotStarted,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SuspensionState {
        self.state
    }

    /// Give back the wrapped procedure
    #[must_use]
    pub fn into_inner(self) -> P {
        self.procedure
    }

    fn violation(&self, what: &str) -> Error {
        let message = format!("{} {what}", self.procedure.name());
        warn!(state = %self.state, "{message}");
        Error::configuration(message)
    }
}

impl<P: Procedure> fmt::Debug for ProcedureContext<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureContext")
            .field("procedure", &self.procedure.name())
            .field("state", &self.state)
            .finish()
    }
}

impl<P: Procedure> ContextManager for ProcedureContext<P> {
    type Target = P::Yield;

    fn enter(&mut self) -> Result<P::Yield> {
        if self.state != SuspensionState::NotStarted {
            return Err(self.violation("cannot be entered twice"));
        }

        match self.procedure.resume(Resume::Next) {
            Step::Yield(value) => {
                self.state = SuspensionState::Suspended;
                trace!(procedure = self.procedure.name(), "suspended");
                Ok(value)
            }
            Step::Complete => {
                self.state = SuspensionState::Resumed;
                Err(self.violation("did not suspend"))
            }
            Step::Raise(exc) => {
                self.state = SuspensionState::Resumed;
                debug!(procedure = self.procedure.name(), kind = %exc.kind(), "raised before suspending");
                Err(Error::Raised(exc))
            }
        }
    }

    fn exit(&mut self, exception: Option<&Exception>) -> Result<bool> {
        if self.state != SuspensionState::Suspended {
            return Err(self.violation("was resumed without being suspended"));
        }
        self.state = SuspensionState::Resumed;
        trace!(procedure = self.procedure.name(), "resumed");

        let Some(exc) = exception else {
            return match self.procedure.resume(Resume::Next) {
                Step::Complete => Ok(false),
                Step::Yield(_) => Err(self.violation("suspended more than once")),
                Step::Raise(raised) => Err(Error::Raised(raised)),
            };
        };

        match self.procedure.resume(Resume::Throw(exc.clone())) {
            Step::Complete => {
                debug!(procedure = self.procedure.name(), kind = %exc.kind(), "procedure swallowed exception");
                Ok(true)
            }
            Step::Yield(_) => Err(self
                .violation("suspended again after an exception was thrown in")
                .with_context(exc.clone())),
            Step::Raise(raised) if raised.is_same(exc) => Ok(false),
            Step::Raise(raised) => Err(Error::Raised(raised.with_context(exc.clone()))),
        }
    }
}

/// Decision of a catch region
#[derive(Debug, Clone)]
pub enum Handled {
    /// Swallow the exception; the scope exits normally
    Suppress,
    /// Re-raise the caught instance unchanged
    Reraise,
    /// Raise a different exception in its place
    Raise(Exception),
}

type Setup<'a, T> = Box<dyn FnOnce() -> std::result::Result<T, Exception> + 'a>;
type Then<'a> = Box<dyn FnOnce() -> std::result::Result<(), Exception> + 'a>;
type Handler<'a> = Box<dyn FnOnce(&Exception) -> Handled + 'a>;
type Cleanup<'a> = Box<dyn FnOnce() + 'a>;

struct CatchRegion<'a> {
    kind: ExceptionKind,
    handler: Handler<'a>,
}

/// Runs the cleanup region when dropped, including during unwinding
struct CleanupGuard<'a>(Option<Cleanup<'a>>);

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Some(cleanup) = self.0.take() {
            cleanup();
        }
    }
}

/// Single-suspension procedure assembled from closures
///
/// Layout of the equivalent procedure:
///
/// ```text
/// value = setup()
/// try:
///     suspend(value)
///     then()
/// except <kind>:      # one per `except`, first match wins
///     handler(e)
/// finally:
///     cleanup()
/// after()               # clean body or suppressed exception only
/// ```
pub struct ScopedProcedure<'a, T> {
    name: String,
    setup: Option<Setup<'a, T>>,
    then: Option<Then<'a>>,
    after: Option<Then<'a>>,
    catches: Vec<CatchRegion<'a>>,
    cleanup: Option<Cleanup<'a>>,
    state: SuspensionState,
}

impl<'a, T> ScopedProcedure<'a, T> {
    /// Start a procedure whose setup yields the scope value
    #[must_use]
    pub fn new<F>(setup: F) -> Self
    where
        F: FnOnce() -> std::result::Result<T, Exception> + 'a,
    {
        Self {
            name: "scoped procedure".to_string(),
            setup: Some(Box::new(setup)),
            then: None,
            after: None,
            catches: Vec::new(),
            cleanup: None,
            state: SuspensionState::NotStarted,
        }
    }

    /// Name shown in diagnostics
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Code after the suspension point, run when the body completed
    #[must_use]
    pub fn then<F>(mut self, then: F) -> Self
    where
        F: FnOnce() -> std::result::Result<(), Exception> + 'a,
    {
        self.then = Some(Box::new(then));
        self
    }

    /// Code after the whole try statement
    ///
    /// Runs once the cleanup region has run, when the body completed or a
    /// catch region suppressed the exception. An exception it raises escapes
    /// the scope.
    #[must_use]
    pub fn after<F>(mut self, after: F) -> Self
    where
        F: FnOnce() -> std::result::Result<(), Exception> + 'a,
    {
        self.after = Some(Box::new(after));
        self
    }

    /// Add a catch region for `kind` and its subclasses
    #[must_use]
    pub fn except<F>(mut self, kind: ExceptionKind, handler: F) -> Self
    where
        F: FnOnce(&Exception) -> Handled + 'a,
    {
        self.catches.push(CatchRegion {
            kind,
            handler: Box::new(handler),
        });
        self
    }

    /// Guaranteed-cleanup region
    #[must_use]
    pub fn finally<F>(mut self, cleanup: F) -> Self
    where
        F: FnOnce() + 'a,
    {
        self.cleanup = Some(Box::new(cleanup));
        self
    }

    /// Wrap into a scope manager
    #[must_use]
    pub fn into_context(self) -> ProcedureContext<Self> {
        ProcedureContext::new(self)
    }

    fn handle(&mut self, exc: Exception) -> Step<T> {
        for region in std::mem::take(&mut self.catches) {
            if !exc.is_instance(region.kind) {
                continue;
            }
            trace!(procedure = %self.name, caught = %region.kind, "catch region entered");
            return match (region.handler)(&exc) {
                Handled::Suppress => Step::Complete,
                Handled::Reraise => Step::Raise(exc),
                Handled::Raise(raised) => Step::Raise(raised.with_context(exc)),
            };
        }
        Step::Raise(exc)
    }
}

impl<T> Procedure for ScopedProcedure<'_, T> {
    type Yield = T;

    fn resume(&mut self, input: Resume) -> Step<T> {
        match (self.state, input) {
            (SuspensionState::NotStarted, Resume::Next) => {
                self.state = SuspensionState::Resumed;
                let Some(setup) = self.setup.take() else {
                    return Step::Complete;
                };
                match setup() {
                    Ok(value) => {
                        self.state = SuspensionState::Suspended;
                        Step::Yield(value)
                    }
                    Err(exc) => Step::Raise(exc),
                }
            }
            (SuspensionState::NotStarted, Resume::Throw(exc)) => {
                self.state = SuspensionState::Resumed;
                Step::Raise(exc)
            }
            (SuspensionState::Suspended, input) => {
                self.state = SuspensionState::Resumed;
                let step = {
                    let _cleanup = CleanupGuard(self.cleanup.take());
                    let outcome = match input {
                        Resume::Next => self.then.take().map_or(Ok(()), |then| then()),
                        Resume::Throw(exc) => Err(exc),
                    };
                    match outcome {
                        Ok(()) => Step::Complete,
                        Err(exc) => self.handle(exc),
                    }
                };
                match (step, self.after.take()) {
                    (Step::Complete, Some(after)) => match after() {
                        Ok(()) => Step::Complete,
                        Err(exc) => Step::Raise(exc),
                    },
                    (step, _) => step,
                }
            }
            (SuspensionState::Resumed, Resume::Next) => Step::Complete,
            (SuspensionState::Resumed, Resume::Throw(exc)) => Step::Raise(exc),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<T> fmt::Debug for ScopedProcedure<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedProcedure")
            .field("name", &self.name)
            .field("catch_regions", &self.catches.len())
            .field("has_after", &self.after.is_some())
            .field("has_cleanup", &self.cleanup.is_some())
            .field("state", &self.state)
            .finish()
    }
}
