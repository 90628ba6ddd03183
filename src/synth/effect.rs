use super::reverb::Reverb;

/// Output ceiling of the soft clipper; keeps |y| strictly below full scale
/// even where f32 `tanh` rounds to 1.0.
pub const CLIP_CEILING: f32 = 1.0 - f32::EPSILON;

/// Hyperbolic-tangent saturation.
#[inline]
pub fn soft_clip(input: f32, drive: f32) -> f32 {
    (input * drive).tanh() * CLIP_CEILING
}

#[derive(Clone, Copy, Debug)]
pub struct SoftClip {
    pub drive: f32,
}

impl SoftClip {
    pub fn new(drive: f32) -> Self {
        Self { drive }
    }

    pub fn process(&self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = soft_clip(*sample, self.drive);
        }
    }
}

pub enum EffectType {
    SoftClip(SoftClip),
    Reverb(Reverb),
}

/// One stage of the stereo post-processing chain.
pub struct Effect {
    pub effect: EffectType,
}

impl Effect {
    pub fn new(effect: EffectType) -> Self {
        Self { effect }
    }

    pub fn apply(&mut self, left: &mut [f32], right: &mut [f32]) {
        match &mut self.effect {
            EffectType::SoftClip(clip) => {
                clip.process(left);
                clip.process(right);
            }
            EffectType::Reverb(reverb) => reverb.process_stereo(left, right),
        }
    }

    pub fn configure(&mut self, sample_rate: f32) {
        match &mut self.effect {
            EffectType::SoftClip(_) => {}
            EffectType::Reverb(reverb) => reverb.configure(sample_rate),
        }
    }

    pub fn reset(&mut self) {
        match &mut self.effect {
            EffectType::SoftClip(_) => {}
            EffectType::Reverb(reverb) => reverb.reset(),
        }
    }
}
