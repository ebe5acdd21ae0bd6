//! glow render backend for splatview.
//!
//! Adapts a live OpenGL 3.3 core context to [`GraphicsContext`], and draws
//! the rest of the scene around the cube: a grid floor and a stand-in splat
//! cloud. Orbit camera controls live here too.
//!
//! # Invariants
//! - The cube core never sees `glow` types; it only talks to
//!   [`GraphicsContext`].
//! - Passes own their GPU objects and release them in `destroy`.
//! - Camera motion is host state; nothing here feeds back into the cube's
//!   buffers.
//!
//! [`GraphicsContext`]: splatview_render::GraphicsContext

mod camera;
mod context;
mod passes;
mod shaders;

pub use camera::OrbitCamera;
pub use context::{BackendError, GlowContext};
pub use passes::{GridPass, PassError, SplatPass};
