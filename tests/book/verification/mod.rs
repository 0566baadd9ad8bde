//! Verification chapter

mod oracles;
