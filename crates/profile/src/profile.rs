use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::category::{Category, CATEGORY_COUNT};
use crate::notation::{is_chord, is_rest, token_base, Layer, PatternDoc, Pitch};

/// Sample and instrument names counted as bright for the timbral features.
const BRIGHT_SOURCES: [&str; 7] = ["hh", "oh", "crash", "ride", "sine", "bell", "triangle"];

/// The six-category numeric description of an artifact ("DNA").
///
/// Every sub-feature is normalized to `[0, 1]`. A category may be absent on
/// hand-built profiles (externally supplied DNA); profiles derived from an
/// artifact always carry all six. Derivation is a pure function of the
/// artifact's content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureProfile {
    categories: [Option<Vec<f64>>; CATEGORY_COUNT],
}

impl FeatureProfile {
    /// Profile with no populated categories.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derive a profile from an artifact. Malformed content degrades to an
    /// empty profile; this never fails.
    #[must_use]
    pub fn from_artifact(artifact: &Artifact) -> Self {
        match PatternDoc::parse(&artifact.content) {
            Some(doc) => Self::from_doc(&doc),
            None => {
                log::debug!("artifact content unparseable, deriving empty profile");
                Self::empty()
            }
        }
    }

    /// Derive a profile from an already-parsed pattern. Populates all six
    /// categories.
    #[must_use]
    pub fn from_doc(doc: &PatternDoc) -> Self {
        let mut profile = Self::empty();
        profile.set_category(Category::Rhythmic, rhythmic_features(doc));
        profile.set_category(Category::Melodic, melodic_features(doc));
        profile.set_category(Category::Harmonic, harmonic_features(doc));
        profile.set_category(Category::Textural, textural_features(doc));
        profile.set_category(Category::Structural, structural_features(doc));
        profile.set_category(Category::Timbral, timbral_features(doc));
        profile
    }

    /// Sub-feature vector for a category, if populated.
    #[must_use]
    pub fn category(&self, category: Category) -> Option<&[f64]> {
        self.categories[category.index()].as_deref()
    }

    /// Set a category vector. Values are clamped to `[0, 1]` and the vector
    /// is padded/truncated to the category's fixed dimension.
    pub fn set_category(&mut self, category: Category, mut values: Vec<f64>) {
        values.resize(category.dimension(), 0.0);
        for value in &mut values {
            *value = value.clamp(0.0, 1.0);
        }
        self.categories[category.index()] = Some(values);
    }

    /// Remove a category (used to model externally supplied partial DNA).
    pub fn clear_category(&mut self, category: Category) {
        self.categories[category.index()] = None;
    }

    /// True when no category is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(Option::is_none)
    }

    /// Iterate populated categories with their vectors.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[f64])> {
        Category::ALL
            .iter()
            .filter_map(move |&c| self.category(c).map(|v| (c, v)))
    }
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

fn sound_layers(doc: &PatternDoc) -> impl Iterator<Item = &Layer> {
    doc.layers.iter().filter(|l| l.is_sound())
}

fn note_layers(doc: &PatternDoc) -> impl Iterator<Item = &Layer> {
    doc.layers.iter().filter(|l| l.is_note())
}

/// Drum-hit density per class, plus polyrhythm and syncopation flags.
fn rhythmic_features(doc: &PatternDoc) -> Vec<f64> {
    let mut kick = 0usize;
    let mut snare = 0usize;
    let mut hihat = 0usize;
    let mut total = 0usize;
    let mut syncopation = false;

    for layer in sound_layers(doc) {
        let tokens = layer.tokens();
        for window in tokens.windows(2) {
            let next = token_base(&window[1]);
            if is_rest(&window[0]) && (next.starts_with("bd") || next.starts_with("sd")) {
                syncopation = true;
            }
        }
        for token in tokens {
            total += 1;
            let base = token_base(token);
            if base.starts_with("bd") {
                kick += 1;
            } else if base.starts_with("sd") {
                snare += 1;
            } else if base.starts_with("hh") {
                hihat += 1;
            }
        }
    }

    let polyrhythm = doc
        .layers
        .iter()
        .flat_map(|l| l.tokens())
        .any(|t| t.ends_with("*3") || t.ends_with("*5") || t.ends_with("*7"));

    vec![
        ratio(kick, total),
        ratio(snare, total),
        ratio(hihat, total),
        if polyrhythm { 1.0 } else { 0.0 },
        if syncopation { 1.0 } else { 0.0 },
    ]
}

/// All simple pitches of the pattern's note layers, chord members included.
fn collect_pitches(layer: &Layer) -> Vec<Pitch> {
    let mut pitches = Vec::new();
    for token in layer.tokens() {
        if is_chord(token) {
            for inner in token[1..token.len() - 1].split(',') {
                if let Some(pitch) = Pitch::parse(inner.trim()) {
                    pitches.push(pitch);
                }
            }
        } else if let Some(pitch) = Pitch::parse(token) {
            pitches.push(pitch);
        }
    }
    pitches
}

/// Note-event span, pitch range, contour activity and melodic density.
fn melodic_features(doc: &PatternDoc) -> Vec<f64> {
    let mut token_count = 0usize;
    let mut active = 0usize;
    let mut pitches: Vec<Pitch> = Vec::new();
    let mut direction_changes = 0usize;
    let mut deltas = 0usize;

    for layer in note_layers(doc) {
        token_count += layer.tokens().len();
        active += layer.tokens().iter().filter(|t| !is_rest(t)).count();

        let line = collect_pitches(layer);
        let mut last_delta = 0i32;
        for pair in line.windows(2) {
            let delta = pair[1].semitone() - pair[0].semitone();
            deltas += 1;
            if delta != 0 && last_delta != 0 && delta.signum() != last_delta.signum() {
                direction_changes += 1;
            }
            if delta != 0 {
                last_delta = delta;
            }
        }
        pitches.extend(line);
    }

    let range = match (
        pitches.iter().map(Pitch::semitone).min(),
        pitches.iter().map(Pitch::semitone).max(),
    ) {
        (Some(lo), Some(hi)) => clamp01(f64::from(hi - lo) / 24.0),
        _ => 0.0,
    };

    vec![
        clamp01(token_count as f64 / 32.0),
        range,
        ratio(direction_changes, deltas.max(1)),
        ratio(active, token_count),
    ]
}

/// Chord density, pitch-class spread and accidental ratio.
fn harmonic_features(doc: &PatternDoc) -> Vec<f64> {
    let mut note_tokens = 0usize;
    let mut chords = 0usize;
    let mut pitch_tokens = 0usize;
    let mut accidentals = 0usize;
    let mut classes = [false; 12];

    for layer in note_layers(doc) {
        for token in layer.tokens() {
            note_tokens += 1;
            if is_chord(token) {
                chords += 1;
            }
        }
        for pitch in collect_pitches(layer) {
            pitch_tokens += 1;
            if pitch.accidental.is_some() {
                accidentals += 1;
            }
            classes[usize::from(pitch.pitch_class())] = true;
        }
    }

    vec![
        ratio(chords, note_tokens),
        classes.iter().filter(|&&c| c).count() as f64 / 12.0,
        ratio(accidentals, pitch_tokens),
    ]
}

/// Layer count, effect count, dynamic range and stereo spread.
fn textural_features(doc: &PatternDoc) -> Vec<f64> {
    let gains: Vec<f64> = doc
        .layers
        .iter()
        .filter_map(|l| l.effect("gain"))
        .collect();
    let dynamic_range = match (
        gains.iter().cloned().reduce(f64::min),
        gains.iter().cloned().reduce(f64::max),
    ) {
        (Some(lo), Some(hi)) => clamp01(hi - lo),
        _ => 0.0,
    };
    let panned = doc.layers.iter().filter(|l| l.effect("pan").is_some()).count();

    vec![
        clamp01(doc.layers.len() as f64 / 10.0),
        clamp01(doc.effect_count() as f64 / 8.0),
        dynamic_range,
        ratio(panned, doc.layers.len()),
    ]
}

/// Length, repetition, variation and weighted element complexity.
///
/// Complexity weights: sound layers x1, note layers x2, modifiers x0.5,
/// stacking bonus x3.
fn structural_features(doc: &PatternDoc) -> Vec<f64> {
    let all_tokens: Vec<&String> = doc.layers.iter().flat_map(|l| l.tokens()).collect();
    let distinct = {
        let mut seen: Vec<&str> = Vec::new();
        for token in &all_tokens {
            if !seen.contains(&token.as_str()) {
                seen.push(token);
            }
        }
        seen.len()
    };
    let variation = ratio(distinct, all_tokens.len());

    let sounds = sound_layers(doc).count();
    let notes = note_layers(doc).count();
    let stacking = if doc.layers.len() > 1 { 3.0 } else { 0.0 };
    let complexity =
        sounds as f64 + notes as f64 * 2.0 + doc.effect_count() as f64 * 0.5 + stacking;

    vec![
        clamp01(ratio(all_tokens.len(), doc.layers.len()) / 16.0),
        clamp01(1.0 - variation),
        variation,
        clamp01(complexity / 24.0),
    ]
}

/// Palette size, timbral diversity, processing level and brightness.
fn timbral_features(doc: &PatternDoc) -> Vec<f64> {
    let mut sources: Vec<String> = Vec::new();
    for layer in &doc.layers {
        if layer.is_sound() {
            for token in layer.tokens() {
                if !is_rest(token) {
                    sources.push(token_base(token).to_string());
                }
            }
        }
        if let Some(instrument) = &layer.instrument {
            sources.push(instrument.clone());
        }
    }
    let mut distinct: Vec<&str> = Vec::new();
    for source in &sources {
        if !distinct.contains(&source.as_str()) {
            distinct.push(source);
        }
    }

    let pitches: Vec<Pitch> = note_layers(doc).flat_map(collect_pitches).collect();
    let bright_sources = sources
        .iter()
        .filter(|s| BRIGHT_SOURCES.contains(&s.as_str()))
        .count();
    let bright_pitches = pitches.iter().filter(|p| p.octave >= 4).count();
    let brightness = ratio(bright_sources + bright_pitches, sources.len() + pitches.len());

    vec![
        clamp01(distinct.len() as f64 / 8.0),
        ratio(distinct.len(), sources.len()),
        clamp01(ratio(doc.effect_count(), doc.layers.len()) / 4.0),
        brightness,
    ]
}
