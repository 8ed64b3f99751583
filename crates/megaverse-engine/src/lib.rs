//! # megaverse-engine
//!
//! Reconciles the remote Megaverse grid with its goal.
//!
//! The engine loads the goal once, then on demand:
//! - resets the remote grid by deleting every occupied cell
//! - repopulates it from the goal, one placement per non-SPACE token
//! - fetches it and diffs it cell-by-cell against the goal
//!
//! All remote calls are issued sequentially through the retrying
//! [`megaverse_client::RequestClient`]; nothing about the remote grid is
//! cached locally.

mod diff;
mod engine;

pub use diff::{diff_grids, render_cell, render_grid, Mismatch};
pub use engine::{Megaverse, ReconcileReport};
