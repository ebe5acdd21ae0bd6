use crate::customization::ShaderCustomization;
use crate::template::{COLOR_CORRECTION_ENTRY_POINT, ShaderTemplate, Zone};
use std::cmp::Reverse;

/// Template/customization contract violations found while composing.
///
/// These indicate a programming error (a malformed template or a
/// customization that smuggles marker text), never a driver problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    #[error("zone {zone}: marker `{marker}` not found")]
    MissingMarker { zone: Zone, marker: &'static str },
    #[error("zone {zone}: marker `{marker}` appears {count} times, expected once")]
    DuplicateMarker {
        zone: Zone,
        marker: &'static str,
        count: usize,
    },
    #[error("zone {zone}: end marker precedes begin marker")]
    MarkersOutOfOrder { zone: Zone },
    #[error("zones {first} and {second} overlap")]
    ZonesOverlap { first: Zone, second: Zone },
    #[error("content for zone {zone} contains marker `{marker}`")]
    MarkerInContent { zone: Zone, marker: &'static str },
}

/// Final vertex and fragment source, ready for the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedShader {
    pub vertex: String,
    pub fragment: String,
}

impl ComposedShader {
    /// Whether the color-correction zone defines the entry point `main()` calls.
    pub fn defines_color_correction(&self) -> bool {
        zone_content(&self.fragment, Zone::ColorCorrection)
            .map(defines_entry_point)
            .unwrap_or(false)
    }
}

/// Byte offsets of one zone inside a source string.
///
/// `content_start..content_end` is the replaceable span: it starts right
/// after the begin marker and stops at the start of the end marker's line,
/// so indentation in front of the end marker survives replacement.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ZoneSpan {
    zone: Zone,
    begin: usize,
    content_start: usize,
    content_end: usize,
    end: usize,
}

fn find_unique(source: &str, zone: Zone, marker: &'static str) -> Result<usize, ComposeError> {
    let mut hits = source.match_indices(marker).map(|(at, _)| at);
    let first = hits
        .next()
        .ok_or(ComposeError::MissingMarker { zone, marker })?;
    let extra = hits.count();
    if extra > 0 {
        return Err(ComposeError::DuplicateMarker {
            zone,
            marker,
            count: extra + 1,
        });
    }
    Ok(first)
}

fn locate(source: &str, zone: Zone) -> Result<ZoneSpan, ComposeError> {
    let begin_marker = zone.begin_marker();
    let end_marker = zone.end_marker();
    let begin = find_unique(source, zone, begin_marker)?;
    let end_at = find_unique(source, zone, end_marker)?;

    let content_start = begin + begin_marker.len();
    if end_at < content_start {
        return Err(ComposeError::MarkersOutOfOrder { zone });
    }
    let content_end = source[..end_at]
        .rfind('\n')
        .map_or(content_start, |nl| nl + 1)
        .max(content_start);

    Ok(ZoneSpan {
        zone,
        begin,
        content_start,
        content_end,
        end: end_at + end_marker.len(),
    })
}

/// Locate every zone and check that no two zones interleave.
pub(crate) fn locate_all(source: &str) -> Result<[ZoneSpan; 3], ComposeError> {
    let spans = [
        locate(source, Zone::AdditionalUniforms)?,
        locate(source, Zone::AdditionalFunctions)?,
        locate(source, Zone::ColorCorrection)?,
    ];

    let mut ordered = spans;
    ordered.sort_by_key(|span| span.begin);
    for pair in ordered.windows(2) {
        if pair[0].end > pair[1].begin {
            return Err(ComposeError::ZonesOverlap {
                first: pair[0].zone,
                second: pair[1].zone,
            });
        }
    }
    Ok(spans)
}

/// Current content of `zone` inside `source`, with surrounding whitespace
/// trimmed.
pub fn zone_content(source: &str, zone: Zone) -> Result<&str, ComposeError> {
    let span = locate(source, zone)?;
    Ok(source[span.content_start..span.content_end].trim())
}

/// Whether `source` contains a definition shaped like
/// `vec4 applyColorCorrection(`.
pub fn defines_entry_point(source: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    source
        .match_indices(COLOR_CORRECTION_ENTRY_POINT)
        .any(|(at, name)| {
            let head = &source[..at];
            let tail = source[at + name.len()..].trim_start();
            let return_type = head.trim_end();
            head.ends_with(char::is_whitespace)
                && tail.starts_with('(')
                && return_type.ends_with("vec4")
                && !return_type[..return_type.len() - 4].ends_with(is_ident)
        })
}

fn check_content(zone: Zone, content: &str) -> Result<(), ComposeError> {
    for other in Zone::ALL {
        for marker in [other.begin_marker(), other.end_marker()] {
            if content.contains(marker) {
                return Err(ComposeError::MarkerInContent { zone, marker });
            }
        }
    }
    Ok(())
}

fn zone_body(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        "\n".to_owned()
    } else {
        format!("\n{trimmed}\n")
    }
}

/// Fill the template's zones from `customization`.
///
/// Provided fields (including empty strings) replace the zone's span with the
/// trimmed content; omitted fields keep the template default byte-for-byte.
/// The vertex source passes through untouched.
pub fn compose(
    template: &ShaderTemplate,
    customization: &ShaderCustomization,
) -> Result<ComposedShader, ComposeError> {
    let spans = locate_all(template.fragment())?;
    for zone in Zone::ALL {
        if let Some(content) = customization.get(zone) {
            check_content(zone, content)?;
        }
    }

    let mut fragment = template.fragment().to_owned();
    let mut back_to_front = spans;
    back_to_front.sort_by_key(|span| Reverse(span.begin));
    for span in back_to_front {
        if let Some(content) = customization.get(span.zone) {
            fragment.replace_range(span.content_start..span.content_end, &zone_body(content));
            tracing::debug!(zone = %span.zone, bytes = content.trim().len(), "zone replaced");
        }
    }

    locate_all(&fragment)?;

    Ok(ComposedShader {
        vertex: template.vertex().to_owned(),
        fragment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_zones_template(fragment: &'static str) -> ShaderTemplate {
        ShaderTemplate::new("void main() {}", fragment)
    }

    fn assert_markers_unique(source: &str) {
        for zone in Zone::ALL {
            assert_eq!(source.matches(zone.begin_marker()).count(), 1, "{zone} begin");
            assert_eq!(source.matches(zone.end_marker()).count(), 1, "{zone} end");
        }
    }

    #[test]
    fn provided_fields_replace_every_zone() {
        let template = ShaderTemplate::cube();
        let custom = ShaderCustomization::new()
            .with_additional_uniforms("\n  uniform float uTime;\nuniform float uBrightness;  \n")
            .with_additional_functions("float pulse(float t) { return 0.5 + 0.5 * sin(t); }")
            .with_color_correction_function(
                "vec4 applyColorCorrection(vec4 color) {\n    return vec4(color.rgb * uBrightness, color.a);\n}",
            );
        let out = compose(&template, &custom).unwrap();

        assert_eq!(
            zone_content(&out.fragment, Zone::AdditionalUniforms).unwrap(),
            "uniform float uTime;\nuniform float uBrightness;"
        );
        assert_eq!(
            zone_content(&out.fragment, Zone::AdditionalFunctions).unwrap(),
            "float pulse(float t) { return 0.5 + 0.5 * sin(t); }"
        );
        assert!(
            zone_content(&out.fragment, Zone::ColorCorrection)
                .unwrap()
                .contains("color.rgb * uBrightness")
        );
        assert!(out.fragment.contains(
            "// BEGIN_ADDITIONAL_UNIFORMS\nuniform float uTime;\nuniform float uBrightness;\n// END_ADDITIONAL_UNIFORMS"
        ));
        assert_markers_unique(&out.fragment);
    }

    #[test]
    fn empty_strings_clear_zones() {
        let custom = ShaderCustomization::new()
            .with_additional_uniforms("")
            .with_additional_functions("")
            .with_color_correction_function("");
        let out = compose(&ShaderTemplate::cube(), &custom).unwrap();
        for zone in Zone::ALL {
            assert_eq!(zone_content(&out.fragment, zone).unwrap(), "");
        }
        assert!(
            out.fragment
                .contains("// BEGIN_COLOR_CORRECTION\n// END_COLOR_CORRECTION")
        );
        assert!(!out.defines_color_correction());
        assert_markers_unique(&out.fragment);
    }

    #[test]
    fn omitted_fields_keep_defaults() {
        let template = ShaderTemplate::cube();
        let custom = ShaderCustomization::new().with_additional_uniforms("uniform float uTime;");
        let out = compose(&template, &custom).unwrap();

        for zone in [Zone::AdditionalFunctions, Zone::ColorCorrection] {
            assert_eq!(
                zone_content(&out.fragment, zone).unwrap(),
                template.default_zone_content(zone).unwrap()
            );
        }
        assert!(out.defines_color_correction());
    }

    #[test]
    fn empty_customization_is_identity() {
        let template = ShaderTemplate::cube();
        let out = compose(&template, &ShaderCustomization::default()).unwrap();
        assert_eq!(out.fragment, template.fragment());
        assert_eq!(out.vertex, template.vertex());
    }

    #[test]
    fn composition_is_deterministic() {
        let template = ShaderTemplate::cube();
        let custom = ShaderCustomization::new()
            .with_additional_functions("vec3 tint(vec3 c) { return c * vec3(1.0, 0.9, 0.8); }");
        assert_eq!(
            compose(&template, &custom).unwrap(),
            compose(&template, &custom).unwrap()
        );
    }

    #[test]
    fn missing_marker_fails() {
        let template = all_zones_template(
            "// BEGIN_ADDITIONAL_UNIFORMS\n// END_ADDITIONAL_UNIFORMS\n\
             // BEGIN_ADDITIONAL_FUNCTIONS\n// END_ADDITIONAL_FUNCTIONS\n\
             // BEGIN_COLOR_CORRECTION\n",
        );
        assert_eq!(
            compose(&template, &ShaderCustomization::default()),
            Err(ComposeError::MissingMarker {
                zone: Zone::ColorCorrection,
                marker: "// END_COLOR_CORRECTION",
            })
        );
    }

    #[test]
    fn duplicate_marker_fails() {
        let template = all_zones_template(
            "// BEGIN_ADDITIONAL_UNIFORMS\n// END_ADDITIONAL_UNIFORMS\n\
             // BEGIN_ADDITIONAL_FUNCTIONS\n// END_ADDITIONAL_FUNCTIONS\n\
             // BEGIN_ADDITIONAL_FUNCTIONS\n// END_ADDITIONAL_FUNCTIONS\n\
             // BEGIN_COLOR_CORRECTION\n// END_COLOR_CORRECTION\n",
        );
        assert_eq!(
            compose(&template, &ShaderCustomization::default()),
            Err(ComposeError::DuplicateMarker {
                zone: Zone::AdditionalFunctions,
                marker: "// BEGIN_ADDITIONAL_FUNCTIONS",
                count: 2,
            })
        );
    }

    #[test]
    fn reversed_markers_fail() {
        let template = all_zones_template(
            "// END_ADDITIONAL_UNIFORMS\n// BEGIN_ADDITIONAL_UNIFORMS\n\
             // BEGIN_ADDITIONAL_FUNCTIONS\n// END_ADDITIONAL_FUNCTIONS\n\
             // BEGIN_COLOR_CORRECTION\n// END_COLOR_CORRECTION\n",
        );
        assert_eq!(
            template.validate(),
            Err(ComposeError::MarkersOutOfOrder {
                zone: Zone::AdditionalUniforms
            })
        );
    }

    #[test]
    fn interleaved_zones_fail() {
        let template = all_zones_template(
            "// BEGIN_ADDITIONAL_UNIFORMS\n// BEGIN_ADDITIONAL_FUNCTIONS\n\
             // END_ADDITIONAL_UNIFORMS\n// END_ADDITIONAL_FUNCTIONS\n\
             // BEGIN_COLOR_CORRECTION\n// END_COLOR_CORRECTION\n",
        );
        assert_eq!(
            template.validate(),
            Err(ComposeError::ZonesOverlap {
                first: Zone::AdditionalUniforms,
                second: Zone::AdditionalFunctions,
            })
        );
    }

    #[test]
    fn marker_text_in_content_is_rejected() {
        let custom = ShaderCustomization::new()
            .with_additional_functions("// END_COLOR_CORRECTION\nvoid oops() {}");
        assert_eq!(
            compose(&ShaderTemplate::cube(), &custom),
            Err(ComposeError::MarkerInContent {
                zone: Zone::AdditionalFunctions,
                marker: "// END_COLOR_CORRECTION",
            })
        );
    }

    #[test]
    fn indented_end_marker_keeps_indentation() {
        let template = all_zones_template(
            "    // BEGIN_ADDITIONAL_UNIFORMS\n    old\n    // END_ADDITIONAL_UNIFORMS\n\
             // BEGIN_ADDITIONAL_FUNCTIONS\n// END_ADDITIONAL_FUNCTIONS\n\
             // BEGIN_COLOR_CORRECTION\n// END_COLOR_CORRECTION\n",
        );
        let custom = ShaderCustomization::new().with_additional_uniforms("new");
        let out = compose(&template, &custom).unwrap();
        assert!(out.fragment.starts_with(
            "    // BEGIN_ADDITIONAL_UNIFORMS\nnew\n    // END_ADDITIONAL_UNIFORMS\n"
        ));
    }

    #[test]
    fn entry_point_detection() {
        assert!(defines_entry_point(
            "vec4 applyColorCorrection(vec4 color) { return color; }"
        ));
        assert!(defines_entry_point(
            "float k = 2.0;\nvec4  applyColorCorrection (vec4 c) { return c * k; }"
        ));
        assert!(!defines_entry_point(
            "vec4 applyColourCorrection(vec4 color) { return color; }"
        ));
        assert!(!defines_entry_point("vec3 applyColorCorrection(vec3 color) { return color; }"));
        assert!(!defines_entry_point("ivec4 applyColorCorrection(ivec4 c) { return c; }"));
        assert!(!defines_entry_point(
            "vec4 applyColorCorrectionFast(vec4 color) { return color; }"
        ));
        assert!(!defines_entry_point("fragColor = applyColorCorrection(vColor);"));
    }
}
