//! ポートの実装。

pub mod fetched_tree;
pub mod git;
pub mod interrupt;
pub mod process;
pub mod scripted_prompt;
pub mod transform;
