//! Shader templating: fixed cube shaders with three named injection zones
//! and a pure compositor that fills them from a [`ShaderCustomization`].
//!
//! # Invariants
//! - Every zone marker appears exactly once in a valid template and in every
//!   composed output.
//! - Composition never edits marker text, only the span between a zone's
//!   begin and end markers.
//! - Composition is deterministic: same template + same customization gives
//!   byte-identical source.

mod compose;
mod customization;
mod template;

pub use compose::{ComposeError, ComposedShader, compose, defines_entry_point, zone_content};
pub use customization::{CustomizationError, ShaderCustomization};
pub use template::{
    COLOR_ATTRIBUTE, COLOR_CORRECTION_ENTRY_POINT, MODEL_VIEW_UNIFORM, POSITION_ATTRIBUTE,
    PROJECTION_UNIFORM, ShaderTemplate, Zone,
};

pub fn crate_info() -> &'static str {
    "splatview-shader v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("shader"));
    }
}
