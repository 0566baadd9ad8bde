//! Scope protocol and scope runner
//!
//! A type joins a scoped block by implementing [`ContextManager`]; [`with`]
//! runs a body between its `enter` and `exit` hooks.
//!
//! # Guarantees
//!
//! - `exit` runs exactly once for every successful `enter`, whether the body
//!   completes, returns early, raises, or panics.
//! - A failing `enter` skips both the body and `exit`.
//! - An exception raised by the body propagates unchanged unless `exit`
//!   returns `true`.
//!
//! # Example
//!
//! ```rust
//! use scopekit::protocol::{with, ScopeOutcome};
//! use scopekit::scenarios::ExampleHandler;
//! use scopekit::{Exception, Transcript};
//!
//! let console = Transcript::new();
//! let handler = ExampleHandler::new(&console, true);
//! let outcome: ScopeOutcome<()> = with(&handler, |example| {
//!     example.run();
//!     Err(Exception::value_error("ValueError occured."))
//! })?;
//! assert!(outcome.is_suppressed());
//! # Ok::<(), scopekit::Error>(())
//! ```

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::exception::Exception;
use crate::{Error, Result};

/// Capability implemented by anything usable as a scope manager
pub trait ContextManager {
    /// Value bound to the scope's local name
    type Target;

    /// Called on scope entry
    ///
    /// # Errors
    ///
    /// An `Err` aborts the scope before its body runs; `exit` is not called.
    fn enter(&mut self) -> Result<Self::Target>;

    /// Called on scope exit with the in-flight exception, if any
    ///
    /// Returns `true` to suppress the exception.
    ///
    /// # Errors
    ///
    /// An `Err` replaces whatever the scope would otherwise have produced.
    fn exit(&mut self, exception: Option<&Exception>) -> Result<bool>;
}

impl<M: ContextManager + ?Sized> ContextManager for &mut M {
    type Target = M::Target;

    fn enter(&mut self) -> Result<Self::Target> {
        (**self).enter()
    }

    fn exit(&mut self, exception: Option<&Exception>) -> Result<bool> {
        (**self).exit(exception)
    }
}

impl<M: ContextManager + ?Sized> ContextManager for Box<M> {
    type Target = M::Target;

    fn enter(&mut self) -> Result<Self::Target> {
        (**self).enter()
    }

    fn exit(&mut self, exception: Option<&Exception>) -> Result<bool> {
        (**self).exit(exception)
    }
}

/// How a scope ended when nothing escaped it
#[derive(Debug, Clone)]
pub enum ScopeOutcome<R> {
    /// The body ran to completion
    Completed(R),
    /// The body raised and the manager suppressed the exception
    Suppressed(Exception),
}

impl<R> ScopeOutcome<R> {
    /// Whether an exception was suppressed
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed(_))
    }

    /// Body result, if the body completed
    #[must_use]
    pub fn completed(self) -> Option<R> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Suppressed(_) => None,
        }
    }

    /// Suppressed exception, if any
    #[must_use]
    pub fn suppressed(&self) -> Option<&Exception> {
        match self {
            Self::Completed(_) => None,
            Self::Suppressed(exc) => Some(exc),
        }
    }
}

/// Run `body` inside a scope managed by `manager`
///
/// # Errors
///
/// - [`Error::Raised`] when an exception escapes the scope, either from the
///   body (not suppressed) or from the manager's hooks.
/// - [`Error::Configuration`] when the manager violates the protocol.
///
/// # Panics
///
/// A panic in the body is reported to `exit` as a
/// [`Panic`](crate::ExceptionKind::Panic) exception and then resumed.
pub fn with<M, F, R>(mut manager: M, body: F) -> Result<ScopeOutcome<R>>
where
    M: ContextManager,
    F: FnOnce(M::Target) -> std::result::Result<R, Exception>,
{
    let target = manager.enter()?;
    debug!("entered scope");

    let result = panic::catch_unwind(AssertUnwindSafe(move || body(target)));

    match result {
        Ok(Ok(value)) => {
            debug!("scope body completed");
            manager.exit(None)?;
            Ok(ScopeOutcome::Completed(value))
        }
        Ok(Err(exception)) => {
            debug!(kind = %exception.kind(), "scope body raised");
            match manager.exit(Some(&exception)) {
                Ok(true) => {
                    debug!(kind = %exception.kind(), "exception suppressed");
                    Ok(ScopeOutcome::Suppressed(exception))
                }
                Ok(false) => Err(Error::Raised(exception)),
                Err(Error::Raised(raised)) => Err(Error::Raised(raised.with_context(exception))),
                Err(other) => {
                    warn!(error = %other, kind = %exception.kind(), "exit failed with an exception in flight");
                    Err(other.with_context(exception))
                }
            }
        }
        Err(payload) => {
            let exception = Exception::from_panic(payload.as_ref());
            if let Err(err) = manager.exit(Some(&exception)) {
                warn!(error = %err, "exit failed while unwinding");
            }
            panic::resume_unwind(payload)
        }
    }
}
