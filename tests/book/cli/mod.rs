//! Command line chapter

mod usage;
