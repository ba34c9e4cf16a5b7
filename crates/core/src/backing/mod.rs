//! Backing data structures for storing cached binding sets by stable id.

pub mod entry_arena;
