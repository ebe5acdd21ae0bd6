use crate::compose::{self, ComposeError};
use std::borrow::Cow;
use std::fmt;

/// Vertex attribute carrying object-space positions.
pub const POSITION_ATTRIBUTE: &str = "aVertexPosition";
/// Vertex attribute carrying per-vertex RGBA colors.
pub const COLOR_ATTRIBUTE: &str = "aVertexColor";
pub const MODEL_VIEW_UNIFORM: &str = "uModelViewMatrix";
pub const PROJECTION_UNIFORM: &str = "uProjectionMatrix";

/// Function the fixed fragment `main()` calls on every fragment color.
/// Whatever fills [`Zone::ColorCorrection`] must define it as
/// `vec4 applyColorCorrection(vec4 color)`.
pub const COLOR_CORRECTION_ENTRY_POINT: &str = "applyColorCorrection";

const CUBE_VERTEX_SHADER: &str = r#"#version 330 core

in vec3 aVertexPosition;
in vec4 aVertexColor;

uniform mat4 uModelViewMatrix;
uniform mat4 uProjectionMatrix;

out vec4 vColor;

void main() {
    gl_Position = uProjectionMatrix * uModelViewMatrix * vec4(aVertexPosition, 1.0);
    vColor = aVertexColor;
}
"#;

const CUBE_FRAGMENT_SHADER: &str = r#"#version 330 core
precision mediump float;

in vec4 vColor;
out vec4 fragColor;

// BEGIN_ADDITIONAL_UNIFORMS
// END_ADDITIONAL_UNIFORMS

// BEGIN_ADDITIONAL_FUNCTIONS
// END_ADDITIONAL_FUNCTIONS

// BEGIN_COLOR_CORRECTION
vec4 applyColorCorrection(vec4 color) {
    return color;
}
// END_COLOR_CORRECTION

void main() {
    fragColor = applyColorCorrection(vColor);
}
"#;

/// A named, delimited region of fragment source eligible for substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Zone {
    AdditionalUniforms,
    AdditionalFunctions,
    ColorCorrection,
}

impl Zone {
    /// All zones in template order.
    pub const ALL: [Zone; 3] = [
        Zone::AdditionalUniforms,
        Zone::AdditionalFunctions,
        Zone::ColorCorrection,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Zone::AdditionalUniforms => "ADDITIONAL_UNIFORMS",
            Zone::AdditionalFunctions => "ADDITIONAL_FUNCTIONS",
            Zone::ColorCorrection => "COLOR_CORRECTION",
        }
    }

    pub fn begin_marker(self) -> &'static str {
        match self {
            Zone::AdditionalUniforms => "// BEGIN_ADDITIONAL_UNIFORMS",
            Zone::AdditionalFunctions => "// BEGIN_ADDITIONAL_FUNCTIONS",
            Zone::ColorCorrection => "// BEGIN_COLOR_CORRECTION",
        }
    }

    pub fn end_marker(self) -> &'static str {
        match self {
            Zone::AdditionalUniforms => "// END_ADDITIONAL_UNIFORMS",
            Zone::AdditionalFunctions => "// END_ADDITIONAL_FUNCTIONS",
            Zone::ColorCorrection => "// END_COLOR_CORRECTION",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable vertex + fragment source pair.
///
/// The fragment source carries the three [`Zone`]s. Templates are plain data
/// handed to [`compose`](crate::compose); nothing reads a global template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderTemplate {
    vertex: Cow<'static, str>,
    fragment: Cow<'static, str>,
}

impl ShaderTemplate {
    pub fn new(
        vertex: impl Into<Cow<'static, str>>,
        fragment: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// The built-in colored-cube template.
    pub fn cube() -> Self {
        Self::new(CUBE_VERTEX_SHADER, CUBE_FRAGMENT_SHADER)
    }

    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Check marker cardinality, ordering and zone disjointness.
    pub fn validate(&self) -> Result<(), ComposeError> {
        compose::locate_all(&self.fragment).map(|_| ())
    }

    /// Default content of `zone`, trimmed.
    pub fn default_zone_content(&self, zone: Zone) -> Result<&str, ComposeError> {
        compose::zone_content(&self.fragment, zone)
    }
}

impl Default for ShaderTemplate {
    fn default() -> Self {
        Self::cube()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_template_is_valid() {
        ShaderTemplate::cube().validate().unwrap();
    }

    #[test]
    fn markers_are_distinct() {
        let mut markers: Vec<&str> = Zone::ALL
            .iter()
            .flat_map(|z| [z.begin_marker(), z.end_marker()])
            .collect();
        markers.sort_unstable();
        markers.dedup();
        assert_eq!(markers.len(), 6);
    }

    #[test]
    fn markers_embed_zone_name() {
        for zone in Zone::ALL {
            assert!(zone.begin_marker().ends_with(zone.name()));
            assert!(zone.end_marker().ends_with(zone.name()));
            assert_eq!(zone.to_string(), zone.name());
        }
    }

    #[test]
    fn default_color_correction_is_identity() {
        let template = ShaderTemplate::cube();
        let body = template.default_zone_content(Zone::ColorCorrection).unwrap();
        assert!(body.starts_with("vec4 applyColorCorrection(vec4 color)"));
        assert!(body.contains("return color;"));
        assert_eq!(template.default_zone_content(Zone::AdditionalUniforms).unwrap(), "");
        assert_eq!(template.default_zone_content(Zone::AdditionalFunctions).unwrap(), "");
    }

    #[test]
    fn main_calls_entry_point() {
        let template = ShaderTemplate::cube();
        assert!(template.fragment().contains("applyColorCorrection(vColor)"));
        for name in [POSITION_ATTRIBUTE, COLOR_ATTRIBUTE, MODEL_VIEW_UNIFORM, PROJECTION_UNIFORM] {
            assert!(template.vertex().contains(name), "vertex source lacks {name}");
        }
    }

    #[test]
    fn custom_template_without_markers_is_rejected() {
        let template = ShaderTemplate::new(CUBE_VERTEX_SHADER, "void main() {}");
        assert!(matches!(
            template.validate(),
            Err(ComposeError::MissingMarker { zone: Zone::AdditionalUniforms, .. })
        ));
    }
}
