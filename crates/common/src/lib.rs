//! Shared math types for the splatview workspace.
//!
//! # Invariants
//! - `Matrix4` is always row-major: element `(row, col)` lives at `row * 4 + col`.
//! - Conversion to and from `glam` is the only place layout is swapped.

mod matrix;

pub use matrix::Matrix4;

pub fn crate_info() -> &'static str {
    "splatview-common v0.1.0"
}
