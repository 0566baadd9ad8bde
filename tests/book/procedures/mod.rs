//! Suspendable procedure chapter

mod contract;
mod exception_paths;
