//! scopekit - Executable model of scoped resource management
//!
//! scopekit pins down how a scoped block ("with" block) behaves: setup on
//! entry, guaranteed teardown on exit, and interception of exceptions raised
//! in between. It provides both realizations of the scope protocol, runs a
//! catalog of demonstration scenarios, and verifies their console transcripts.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          SCOPEKIT                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Protocol   ←   Procedure   →   Scenarios   →   Oracle      │
//! │  (enter/exit)   (suspend once)  (transcripts)   (diffing)   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use scopekit::prelude::*;
//!
//! let console = Transcript::new();
//! let context = ScopedProcedure::new(|| {
//!     console.print("Starting");
//!     Ok(())
//! })
//! .finally(|| console.print("Exiting"))
//! .into_context();
//!
//! let result: Result<ScopeOutcome<()>> = with(context, |()| Err(Exception::general("boom")));
//! assert!(result.is_err());
//! assert_eq!(console.lines(), vec!["Starting", "Exiting"]);
//! ```
//!
//! # Modules
//!
//! - [`exception`] - Exception kinds, values, tracebacks and exception info
//! - [`console`] - Shared console transcript
//! - [`protocol`] - The `ContextManager` trait and the `with` scope runner
//! - [`procedure`] - Single-suspension procedures as scope managers
//! - [`scenarios`] - Demonstration scenarios with pinned transcripts
//! - [`oracle`] - Transcript verification
//! - [`config`] - Run configuration

#![forbid(unsafe_code)]

pub mod config;
pub mod console;
pub mod error;
pub mod exception;
pub mod oracle;
pub mod procedure;
pub mod protocol;
pub mod scenarios;

pub use console::Transcript;
pub use error::{Error, Result};
pub use exception::{Exception, ExceptionInfo, ExceptionKind, Traceback};



/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::RunConfig;
    pub use crate::oracle::{DiffOptions, Observation, TranscriptOracle, Verdict};
    pub use crate::procedure::{
        contextmanager, Handled, Procedure, ProcedureContext, Resume, ScopedProcedure, Step,
        SuspensionState,
    };
    pub use crate::protocol::{with, ContextManager, ScopeOutcome};
    pub use crate::scenarios::{ExampleHandler, Scenario};
    pub use crate::{Error, Exception, ExceptionKind, Result, Transcript};
}
