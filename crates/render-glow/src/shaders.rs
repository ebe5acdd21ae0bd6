/// GLSL for the grid floor.
pub const GRID_VERTEX: &str = r#"#version 330 core
in vec3 aPosition;
in vec4 aColor;

uniform mat4 uViewProjection;

out vec4 vColor;

void main() {
    gl_Position = uViewProjection * vec4(aPosition, 1.0);
    vColor = aColor;
}
"#;

pub const GRID_FRAGMENT: &str = r#"#version 330 core
in vec4 vColor;
out vec4 fragColor;

void main() {
    fragColor = vColor;
}
"#;

/// GLSL for the stand-in splat cloud: screen-space round points with a
/// gaussian alpha falloff, sized by distance.
pub const SPLAT_VERTEX: &str = r#"#version 330 core
in vec3 aPosition;
in vec4 aColor;
in float aSize;

uniform mat4 uView;
uniform mat4 uProjection;
uniform float uPointScale;

out vec4 vColor;

void main() {
    vec4 viewPos = uView * vec4(aPosition, 1.0);
    gl_Position = uProjection * viewPos;
    gl_PointSize = uPointScale * aSize / max(-viewPos.z, 0.1);
    vColor = aColor;
}
"#;

pub const SPLAT_FRAGMENT: &str = r#"#version 330 core
in vec4 vColor;
out vec4 fragColor;

void main() {
    vec2 p = gl_PointCoord * 2.0 - 1.0;
    float r2 = dot(p, p);
    if (r2 > 1.0) {
        discard;
    }
    fragColor = vec4(vColor.rgb, vColor.a * exp(-4.0 * r2));
}
"#;
