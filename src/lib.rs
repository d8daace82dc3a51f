//! # Bulk Resize
//!
//! Shrink every oversized photo in a folder, in place. Each JPEG or PNG whose
//! width and/or height exceeds a *trigger* is rescaled so the chosen side
//! matches a *target*, aspect ratio preserved. The re-encoded file only
//! replaces the original when it is no larger (unless forced), so a run never
//! makes a folder bigger by accident.
//!
//! # Pipeline
//!
//! Every file goes through the same steps, one file at a time:
//!
//! ```text
//! load ─▶ qualifies? ─no──▶ Skipped(below threshold)
//!              │yes
//!              ▼
//!       scale factor ─▶ rescale ─▶ encode to scratch ─▶ savings >= 0 || force?
//!                                                          │yes        │no
//!                                                          ▼           ▼
//!                                             rename over source   Skipped(negative savings)
//! ```
//!
//! A file that fails at any step is counted as failed and the batch carries
//! on. Cancellation is polled between files.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `ResizeRequest`, `DimensionRule`, `DimensionSpec`, request validation |
//! | [`imaging`] | Resize policy, codec backend (`image` crate), rescale-and-measure |
//! | [`replace`] | Scratch files and the size-gated, atomic replace |
//! | [`batch`] | The sequential driver, progress/cancel monitor, background worker, completion dispatch |
//! | [`report`] | Per-file outcomes and the frozen `BatchReport` |
//! | [`config`] | `resize.toml` loading, merging over stock defaults, validation |
//! | [`discover`] | Finds candidate files in a directory for the CLI |
//! | [`output`] | CLI output formatting: progress lines and the summary |
//!
//! # Design Decisions
//!
//! ## Measure on Disk
//!
//! Savings are the difference between the original's file length and the
//! scratch file's length after encoding. Both numbers describe exactly what
//! ends up on disk, so "no larger" is never an estimate.
//!
//! ## Rename, Never Delete-Then-Move
//!
//! The scratch file is a hidden sibling of the original (`.resize-XXXXXX.jpg`)
//! and is committed with a same-directory rename. The original is either the
//! old bytes or the new bytes at every instant; there is no window where it
//! is missing. Scratch files clean themselves up on drop.
//!
//! ## Completion on the Caller's Thread
//!
//! [`batch::spawn_batch`] runs on its own thread but hands the completion
//! callback to a [`batch::Dispatcher`]. The CLI uses a task queue pumped by
//! its main thread; a UI would pass its own event-loop dispatcher.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Catmull-Rom resampling, and encoding all come from the `image`
//! crate. No ImageMagick, no system libraries.

pub mod batch;
pub mod config;
pub mod discover;
pub mod imaging;
pub mod output;
pub mod replace;
pub mod report;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
