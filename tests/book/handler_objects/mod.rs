//! Handler object chapter

mod lifecycle;
mod suppression;
