//! Book example validation tests
//!
//! Every scope behaviour described in the book has a test here, written the
//! way a reader would use the library.
//!
//! ## Structure
//!
//! - `handler_objects/` - enter/exit handler chapter
//! - `procedures/` - single-suspension procedure chapter
//! - `verification/` - transcript oracle chapter
//! - `cli/` - command line chapter

mod cli;
mod handler_objects;
mod procedures;
mod verification;
