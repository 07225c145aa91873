use rand::Rng;
use serde::{Deserialize, Serialize};

use breeder_profile::{repeat_factor, token_base, Layer, PatternDoc, Pitch};

/// Effects the texture operator may introduce.
const TEXTURE_EFFECTS: [&str; 6] = ["reverb", "delay", "lpf", "hpf", "distortion", "gain"];

/// Circle-of-fifths neighbor map used for harmonic substitution.
const NOTE_MAP: [(char, char); 5] = [('c', 'f'), ('f', 'g'), ('g', 'c'), ('d', 'a'), ('a', 'd')];

/// Instrument swap table for timbral substitution.
const INSTRUMENT_MAP: [(&str, [&str; 3]); 4] = [
    ("piano", ["sawtooth", "sine", "triangle"]),
    ("sawtooth", ["square", "piano", "pluck"]),
    ("sine", ["triangle", "piano", "sawtooth"]),
    ("square", ["sawtooth", "pluck", "sine"]),
];

/// A named structural transformation over a pattern document.
///
/// The standard catalog holds the first eight; `InjectNovelElement` is the
/// escalation-only operator the aggressive pass always ends with. Every
/// operator is a no-op (never an error) when the pattern lacks the feature
/// it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// Rotate drum-token rings by an intensity-scaled offset.
    RhythmicDisplacement,
    /// Substitute pitches with circle-of-fifths neighbors.
    HarmonicSubstitution,
    /// Add one effect to the first layer.
    TextureModulation,
    /// Rescale existing gain values.
    DynamicShaping,
    /// Swap synth instruments via the substitution table.
    TimbralSubstitution,
    /// Append a whole-pattern fast/slow modifier.
    TemporalScaling,
    /// Borrow flattened pitches from the parallel mode.
    ModalInterchange,
    /// Add a ghost `hh*3` polyrhythm layer.
    PolyrhythmicLayering,
    /// Prepend one of the canned novel layers (aggressive pass only).
    InjectNovelElement,
}

impl Operator {
    /// The eight operators the standard pass samples from.
    pub const CATALOG: [Self; 8] = [
        Self::RhythmicDisplacement,
        Self::HarmonicSubstitution,
        Self::TextureModulation,
        Self::DynamicShaping,
        Self::TimbralSubstitution,
        Self::TemporalScaling,
        Self::ModalInterchange,
        Self::PolyrhythmicLayering,
    ];

    /// Human-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RhythmicDisplacement => "rhythmic_displacement",
            Self::HarmonicSubstitution => "harmonic_substitution",
            Self::TextureModulation => "texture_modulation",
            Self::DynamicShaping => "dynamic_shaping",
            Self::TimbralSubstitution => "timbral_substitution",
            Self::TemporalScaling => "temporal_scaling",
            Self::ModalInterchange => "modal_interchange",
            Self::PolyrhythmicLayering => "polyrhythmic_layering",
            Self::InjectNovelElement => "inject_novel_element",
        }
    }

    /// Apply the operator in place. `intensity` in `[0, 1]` controls how
    /// much of the pattern the operator may touch.
    pub fn apply(self, doc: &mut PatternDoc, intensity: f64, rng: &mut impl Rng) {
        let intensity = intensity.clamp(0.0, 1.0);
        match self {
            Self::RhythmicDisplacement => rhythmic_displacement(doc, intensity, rng),
            Self::HarmonicSubstitution => harmonic_substitution(doc, intensity, rng),
            Self::TextureModulation => texture_modulation(doc, rng),
            Self::DynamicShaping => dynamic_shaping(doc, rng),
            Self::TimbralSubstitution => timbral_substitution(doc, intensity, rng),
            Self::TemporalScaling => temporal_scaling(doc, intensity, rng),
            Self::ModalInterchange => modal_interchange(doc, intensity, rng),
            Self::PolyrhythmicLayering => polyrhythmic_layering(doc, intensity, rng),
            Self::InjectNovelElement => inject_novel_element(doc, rng),
        }
    }
}

/// Rotate the token ring of every drum layer by an intensity-scaled offset.
fn rhythmic_displacement(doc: &mut PatternDoc, intensity: f64, rng: &mut impl Rng) {
    for layer in &mut doc.layers {
        if !layer.is_sound() {
            continue;
        }
        let has_drums = layer.tokens().iter().any(|t| {
            let base = token_base(t);
            base.starts_with("bd") || base.starts_with("sd")
        });
        if !has_drums {
            continue;
        }
        let tokens = layer.tokens_mut();
        let offset = (tokens.len() as f64 * intensity * rng.gen::<f64>()) as usize;
        if offset > 0 && offset < tokens.len() {
            tokens.rotate_left(offset);
        }
    }
}

/// Substitute individual pitches with their circle-of-fifths neighbor.
fn harmonic_substitution(doc: &mut PatternDoc, intensity: f64, rng: &mut impl Rng) {
    let chance = intensity * 0.3;
    for layer in &mut doc.layers {
        if !layer.is_note() {
            continue;
        }
        for token in layer.tokens_mut() {
            let Some(mut pitch) = Pitch::parse(token) else {
                continue;
            };
            if !rng.gen_bool(chance) {
                continue;
            }
            if let Some(&(_, to)) = NOTE_MAP.iter().find(|(from, _)| *from == pitch.letter) {
                pitch.letter = to;
                *token = pitch.render();
            }
        }
    }
}

/// Add one randomly chosen effect to the first layer.
fn texture_modulation(doc: &mut PatternDoc, rng: &mut impl Rng) {
    let Some(layer) = doc.layers.first_mut() else {
        return;
    };
    let effect = TEXTURE_EFFECTS[rng.gen_range(0..TEXTURE_EFFECTS.len())];
    let value = round2(rng.gen::<f64>() * 0.5 + 0.2);
    *layer = layer.clone().with_effect(effect, value);
}

/// Rescale every existing gain by a factor in [0.8, 1.2].
fn dynamic_shaping(doc: &mut PatternDoc, rng: &mut impl Rng) {
    for layer in &mut doc.layers {
        for effect in &mut layer.effects {
            if effect.name == "gain" {
                effect.value = round2(effect.value * (0.8 + rng.gen::<f64>() * 0.4));
            }
        }
    }
}

/// Swap instruments through the substitution table.
fn timbral_substitution(doc: &mut PatternDoc, intensity: f64, rng: &mut impl Rng) {
    for layer in &mut doc.layers {
        let Some(current) = layer.instrument.as_deref() else {
            continue;
        };
        let Some((_, alternatives)) = INSTRUMENT_MAP.iter().find(|(name, _)| *name == current)
        else {
            continue;
        };
        if rng.gen_bool(intensity) {
            layer.instrument = Some(alternatives[rng.gen_range(0..alternatives.len())].to_string());
        }
    }
}

/// Append a whole-pattern tempo modifier.
fn temporal_scaling(doc: &mut PatternDoc, intensity: f64, rng: &mut impl Rng) {
    if !rng.gen_bool(intensity) {
        return;
    }
    let name = if rng.gen_bool(0.5) { "fast" } else { "slow" };
    let value = round2(1.0 + rng.gen::<f64>() * 0.5);
    doc.outer_effects.push(breeder_profile::Effect::new(name, value));
}

/// Occasionally flatten a natural pitch (parallel-mode borrowing).
fn modal_interchange(doc: &mut PatternDoc, intensity: f64, rng: &mut impl Rng) {
    let chance = intensity * 0.3;
    for layer in &mut doc.layers {
        if !layer.is_note() {
            continue;
        }
        for token in layer.tokens_mut() {
            let Some(mut pitch) = Pitch::parse(token) else {
                continue;
            };
            if pitch.accidental.is_some() || pitch.letter == 'c' || pitch.letter == 'f' {
                // c and f flatten into the previous natural; skip them.
                continue;
            }
            if rng.gen_bool(chance) {
                pitch.accidental = Some('b');
                *token = pitch.render();
            }
        }
    }
}

/// Add a quiet `hh*3` layer unless the pattern already carries a triplet.
fn polyrhythmic_layering(doc: &mut PatternDoc, intensity: f64, rng: &mut impl Rng) {
    let has_triplet = doc
        .layers
        .iter()
        .flat_map(|l| l.tokens())
        .any(|t| repeat_factor(t) == Some(3));
    if has_triplet || !rng.gen_bool(intensity) {
        return;
    }
    doc.layers.push(Layer::sound(&["hh*3"]).with_effect("gain", 0.2));
}

/// Prepend one of the canned novel layers.
fn inject_novel_element(doc: &mut PatternDoc, rng: &mut impl Rng) {
    let layer = match rng.gen_range(0..4u8) {
        0 => Layer::sound(&["~", "~", "~", "vinyl"]).with_effect("gain", 0.1),
        1 => Layer::note(&["~", "~", "c4", "~"])
            .with_instrument("bell")
            .with_effect("gain", 0.3),
        2 => Layer::sound(&["noise"])
            .with_effect("gain", 0.05)
            .with_effect("lpf", 200.0),
        _ => Layer::note(&["c1"])
            .with_instrument("sub")
            .with_effect("gain", 0.4)
            .with_effect("slow", 8.0),
    };
    doc.layers.insert(0, layer);
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn doc(content: &str) -> PatternDoc {
        PatternDoc::parse(content).unwrap()
    }

    #[test]
    fn displacement_preserves_token_multiset() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pattern = doc("sound(\"bd ~ sd hh\")");
        let mut before: Vec<String> = pattern.layers[0].tokens().to_vec();
        Operator::RhythmicDisplacement.apply(&mut pattern, 1.0, &mut rng);
        let mut after: Vec<String> = pattern.layers[0].tokens().to_vec();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn displacement_skips_melodic_layers() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pattern = doc("note(\"c4 e4 g4\")");
        let before = pattern.clone();
        Operator::RhythmicDisplacement.apply(&mut pattern, 1.0, &mut rng);
        assert_eq!(pattern, before);
    }

    #[test]
    fn dynamic_shaping_without_gain_is_noop() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pattern = doc("sound(\"bd sd\")");
        let before = pattern.clone();
        Operator::DynamicShaping.apply(&mut pattern, 1.0, &mut rng);
        assert_eq!(pattern, before);
    }

    #[test]
    fn texture_modulation_adds_one_effect() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut pattern = doc("sound(\"bd sd\")");
        Operator::TextureModulation.apply(&mut pattern, 0.5, &mut rng);
        assert_eq!(pattern.layers[0].effects.len(), 1);
        let added = &pattern.layers[0].effects[0];
        assert!(TEXTURE_EFFECTS.contains(&added.name.as_str()));
        assert!((0.2..=0.7).contains(&added.value));
    }

    #[test]
    fn polyrhythmic_layering_respects_existing_triplet() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut pattern = doc("sound(\"hh*3 bd\")");
        Operator::PolyrhythmicLayering.apply(&mut pattern, 1.0, &mut rng);
        assert_eq!(pattern.layers.len(), 1);

        let mut plain = doc("sound(\"bd sd\")");
        Operator::PolyrhythmicLayering.apply(&mut plain, 1.0, &mut rng);
        assert_eq!(plain.layers.len(), 2);
        assert_eq!(plain.layers[1].tokens(), ["hh*3"]);
    }

    #[test]
    fn inject_novel_element_prepends_layer() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut pattern = doc("sound(\"bd sd\")");
        Operator::InjectNovelElement.apply(&mut pattern, 1.0, &mut rng);
        assert_eq!(pattern.layers.len(), 2);
        assert_eq!(pattern.layers[1].tokens(), ["bd", "sd"]);
    }

    #[test]
    fn harmonic_substitution_stays_in_map() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut pattern = doc("note(\"c4 d4 e4 f4 g4 a4\")");
        Operator::HarmonicSubstitution.apply(&mut pattern, 1.0, &mut rng);
        for token in pattern.layers[0].tokens() {
            assert!(Pitch::parse(token).is_some(), "token {token} still a pitch");
        }
    }

    #[test]
    fn zero_intensity_probabilistic_operators_are_noops() {
        let mut rng = StdRng::seed_from_u64(19);
        for operator in [
            Operator::HarmonicSubstitution,
            Operator::TimbralSubstitution,
            Operator::TemporalScaling,
            Operator::ModalInterchange,
            Operator::PolyrhythmicLayering,
        ] {
            let mut pattern = doc("note(\"c4 e4 g4\").sound(\"sine\").gain(0.5)");
            let before = pattern.clone();
            operator.apply(&mut pattern, 0.0, &mut rng);
            assert_eq!(pattern, before, "{} mutated at zero intensity", operator.as_str());
        }
    }
}
