//! Exception model for scope bodies
//!
//! A scope body reports failure by returning an [`Exception`]. Exceptions
//! carry a kind from a small class hierarchy, a textual value, and a
//! [`Traceback`] whose address identifies the instance: clones share it, so a
//! re-raised exception can be told apart from a freshly raised one with the
//! same text.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exception classes known to the scope runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExceptionKind {
    /// Root of the hierarchy
    BaseException,
    /// General exception; parent of every ordinary kind
    Exception,
    /// Inappropriate value
    ValueError,
    /// Inappropriate type
    TypeError,
    /// Missing mapping key
    KeyError,
    /// Error that fits no other kind
    RuntimeError,
    /// A Rust panic unwinding through a scope. Not an `Exception`, so broad
    /// catch regions do not swallow it.
    Panic,
}

impl ExceptionKind {
    /// Direct parent in the hierarchy (`None` for the root)
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::BaseException => None,
            Self::Exception | Self::Panic => Some(Self::BaseException),
            Self::ValueError | Self::TypeError | Self::KeyError | Self::RuntimeError => {
                Some(Self::Exception)
            }
        }
    }

    /// Whether `self` is `other` or derives from it
    #[must_use]
    pub fn is_subclass_of(self, other: Self) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Class name as shown in exception info
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::BaseException => "BaseException",
            Self::Exception => "Exception",
            Self::ValueError => "ValueError",
            Self::TypeError => "TypeError",
            Self::KeyError => "KeyError",
            Self::RuntimeError => "RuntimeError",
            Self::Panic => "Panic",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Traceback handle of a raised exception
///
/// Only the address is modelled; it is unique per raised instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Traceback {
    address: u64,
}

impl Traceback {
    const BASE_ADDRESS: u64 = 0x7f3a_0000_0000;
    const STRIDE: u64 = 0x40;

    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        Self {
            address: Self::BASE_ADDRESS + n * Self::STRIDE,
        }
    }

    /// Address of the traceback object
    #[must_use]
    pub fn address(&self) -> u64 {
        self.address
    }
}

impl fmt::Display for Traceback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<traceback object at {:#x}>", self.address)
    }
}

/// An exception raised inside a scope
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct Exception {
    kind: ExceptionKind,
    message: String,
    traceback: Traceback,
    #[source]
    context: Option<Box<Exception>>,
}

impl Exception {
    /// Raise a new exception instance
    #[must_use]
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            traceback: Traceback::fresh(),
            context: None,
        }
    }

    /// New general `Exception`
    #[must_use]
    pub fn general(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::Exception, message)
    }

    /// New `ValueError`
    #[must_use]
    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::ValueError, message)
    }

    /// New `TypeError`
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::TypeError, message)
    }

    /// New `RuntimeError`
    #[must_use]
    pub fn runtime_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::RuntimeError, message)
    }

    /// Describe a caught panic payload as a `Panic` exception
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        Self::new(ExceptionKind::Panic, message)
    }

    /// Exception class
    #[must_use]
    pub fn kind(&self) -> ExceptionKind {
        self.kind
    }

    /// Textual value
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Traceback of this instance
    #[must_use]
    pub fn traceback(&self) -> &Traceback {
        &self.traceback
    }

    /// Exception that was being handled when this one was raised
    #[must_use]
    pub fn context(&self) -> Option<&Exception> {
        self.context.as_deref()
    }

    /// Record `context` as the exception being handled, unless one is
    /// already recorded or `context` is this very instance
    #[must_use]
    pub fn with_context(mut self, context: Exception) -> Self {
        if self.context.is_none() && !self.is_same(&context) {
            self.context = Some(Box::new(context));
        }
        self
    }

    /// Instance identity: true for clones of the same raised exception
    #[must_use]
    pub fn is_same(&self, other: &Exception) -> bool {
        self.traceback == other.traceback
    }

    /// Whether this exception would be caught by a region for `kind`
    #[must_use]
    pub fn is_instance(&self, kind: ExceptionKind) -> bool {
        self.kind.is_subclass_of(kind)
    }

    /// Constructor-call form, e.g. `ValueError('bad')`
    #[must_use]
    pub fn repr(&self) -> String {
        if self.message.is_empty() {
            format!("{}()", self.kind)
        } else {
            format!("{}('{}')", self.kind, self.message)
        }
    }

    /// `Kind: message`, or just `Kind` when the message is empty
    #[must_use]
    pub fn summary(&self) -> String {
        if self.message.is_empty() {
            self.kind.to_string()
        } else {
            format!("{}: {}", self.kind, self.message)
        }
    }

    /// Exception info triple for this exception
    #[must_use]
    pub fn info(&self) -> ExceptionInfo<'_> {
        ExceptionInfo::new(Some(self))
    }
}

/// The `(kind, value, trace)` triple handed to a scope's exit hook
#[derive(Debug, Clone, Copy)]
pub struct ExceptionInfo<'a> {
    exception: Option<&'a Exception>,
}

impl<'a> ExceptionInfo<'a> {
    /// Info for an in-flight exception, or the all-absent triple
    #[must_use]
    pub fn new(exception: Option<&'a Exception>) -> Self {
        Self { exception }
    }

    /// All-absent triple for a normal exit
    #[must_use]
    pub fn none() -> Self {
        Self { exception: None }
    }

    /// Whether an exception is in flight
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.exception.is_some()
    }

    /// Exception class
    #[must_use]
    pub fn kind(&self) -> Option<ExceptionKind> {
        self.exception.map(Exception::kind)
    }

    /// Exception value
    #[must_use]
    pub fn value(&self) -> Option<&'a str> {
        self.exception.map(Exception::message)
    }

    /// Traceback
    #[must_use]
    pub fn trace(&self) -> Option<&'a Traceback> {
        self.exception.map(Exception::traceback)
    }

    /// Underlying exception
    #[must_use]
    pub fn exception(&self) -> Option<&'a Exception> {
        self.exception
    }
}

impl fmt::Display for ExceptionInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exception {
            Some(exc) => write!(
                f,
                "<class '{}'>, {}, {}",
                exc.kind, exc.message, exc.traceback
            ),
            None => f.write_str("None, None, None"),
        }
    }
}
