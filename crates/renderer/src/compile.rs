use std::borrow::Cow;

use effects::EffectKind;
use wgpu::naga::ShaderStage;

/// Program payload handed to a backend when allocating a bundle.
///
/// The GLSL text is opaque to the lifecycle; backends that cannot compile it
/// (the software rasteriser) dispatch on `effect` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderProgram {
    pub label: String,
    pub effect: EffectKind,
    pub vertex: &'static str,
    pub fragment: String,
}

impl ShaderProgram {
    /// Wraps the effect body with the uniform prelude and shared helpers.
    pub fn for_effect(effect: EffectKind) -> Self {
        Self {
            label: format!("{effect} fragment"),
            effect,
            vertex: VERTEX_SHADER_GLSL,
            fragment: wrap_effect_fragment(effect.fragment_source()),
        }
    }
}

pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
    program: &ShaderProgram,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(program.vertex),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    program: &ShaderProgram,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&program.label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(program.fragment.clone()),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// `HEADER`, shared helpers, effect body, then `FOOTER`. `#line` resets keep
/// compiler diagnostics pointing into the body file.
fn wrap_effect_fragment(body: &str) -> String {
    format!(
        "{HEADER}\n{common}\n#line 1\n{body}\n{FOOTER}",
        common = effects::SHADER_COMMON
    )
}

/// Uniform block layout must match `EffectUniforms` in `gpu/uniforms.rs`.
const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;

layout(std140, set = 0, binding = 0) uniform EffectParams {
    vec2 _resolution;
    float _time;
    float _padding;
} ubo;

#define resolution ubo._resolution
#define time ubo._time
";

const FOOTER: &str = r"void main() {
    out_color = vec4(effect_color(v_uv), 1.0);
}
";

/// Full-screen triangle; `v_uv` spans `[0,1]²` with the origin bottom-left.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_program_has_single_version_and_entry_point() {
        for effect in EffectKind::ALL {
            let program = ShaderProgram::for_effect(effect);
            assert_eq!(program.fragment.matches("#version").count(), 1);
            assert_eq!(program.fragment.matches("void main()").count(), 1);
            assert!(program.fragment.contains("effect_color(v_uv)"));
            assert!(program.fragment.starts_with("#version 450"));
        }
    }

    #[test]
    fn program_carries_effect_body() {
        let program = ShaderProgram::for_effect(EffectKind::MorseMatrix);
        assert!(program.fragment.contains("morse_signal"));
        assert_eq!(program.effect, EffectKind::MorseMatrix);
        assert_eq!(program.label, "morse-matrix fragment");
    }
}
