use crate::EffectKind;

/// GLSL helpers shared by every fragment body. Backends prepend this after
/// their own prelude so the bodies can call `hash12`, `value_noise` and
/// friends exactly like the Rust evaluators do.
pub const COMMON: &str = include_str!("../shaders/common.glsl");

pub(crate) fn fragment_body(kind: EffectKind) -> &'static str {
    match kind {
        EffectKind::LiquidMetal => include_str!("../shaders/liquid-metal.glsl"),
        EffectKind::GeometricSpiral => include_str!("../shaders/geometric-spiral.glsl"),
        EffectKind::PulseGrid => include_str!("../shaders/pulse-grid.glsl"),
        EffectKind::MorseMatrix => include_str!("../shaders/morse-matrix.glsl"),
        EffectKind::PlasmaStorm => include_str!("../shaders/plasma-storm.glsl"),
        EffectKind::FluidDynamics => include_str!("../shaders/fluid-dynamics.glsl"),
        EffectKind::TypographyMorph => include_str!("../shaders/typography-morph.glsl"),
        EffectKind::ChromeLiquid => include_str!("../shaders/chrome-liquid.glsl"),
        EffectKind::NeonGenesis => include_str!("../shaders/neon-genesis.glsl"),
        EffectKind::QuantumFlux => include_str!("../shaders/quantum-flux.glsl"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodies_do_not_redeclare_the_prelude() {
        for kind in EffectKind::ALL {
            let body = fragment_body(kind);
            assert!(!body.contains("#version"), "{kind}");
            assert!(!body.contains("void main"), "{kind}");
        }
    }

    #[test]
    fn common_defines_the_shared_helpers() {
        for helper in ["float hash12(", "float lattice_hash(", "float hash13(", "float value_noise_"] {
            assert!(COMMON.contains(helper), "missing {helper}");
        }
    }
}
