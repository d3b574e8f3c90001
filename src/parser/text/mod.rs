//! Story text reconstruction.
//!
//! Runs are read from the generic tree, but the order of a run's text
//! fragments and break markers comes from a trace of the raw story text.
//! Adjacent runs are then merged or joined with spaces, and paragraph
//! boundaries are normalized to blank lines.

mod merge;
mod runs;
mod story;
mod trace;

pub use merge::{is_heading_style, is_punctuation, join_runs, should_merge, Join, RunSide};
pub use runs::{distribute_breaks, Piece, TraceMatcher, TreeRun, RUN_WRAPPERS, UNREADABLE_MARKER};
pub use story::{reconstruct_story, story_id_from_path};
pub use trace::{clean_content, StoryTrace, TraceFragment, TraceRun};
