use bytemuck::{Pod, Zeroable};

use crate::types::Uniforms;

/// CPU mirror of the `EffectParams` std140 block declared in `compile.rs`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct EffectUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub _padding: f32,
}

impl From<&Uniforms> for EffectUniforms {
    fn from(uniforms: &Uniforms) -> Self {
        Self {
            resolution: [
                uniforms.resolution.width as f32,
                uniforms.resolution.height as f32,
            ],
            time: uniforms.time,
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelSize;

    #[test]
    fn layout_matches_std140_block() {
        assert_eq!(std::mem::size_of::<EffectUniforms>(), 16);
        let uniforms = Uniforms {
            time: 2.5,
            resolution: PixelSize::new(1600, 1200),
        };
        let mirrored = EffectUniforms::from(&uniforms);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&mirrored));
        assert_eq!(floats, &[1600.0, 1200.0, 2.5, 0.0]);
    }
}
