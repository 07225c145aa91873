use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LAYER_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(sound|note)\(\s*"([^"]*)"\s*\)"#).expect("valid regex"));

static CHAINED_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\.(\w+)\(\s*(?:"([^"]*)"|([-+]?[0-9]*\.?[0-9]+))\s*\)"#).expect("valid regex")
});

/// A chained numeric modifier on a layer or pattern, e.g. `.gain(0.7)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub name: String,
    pub value: f64,
}

impl Effect {
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    fn render(&self) -> String {
        if (self.value - self.value.round()).abs() < 1e-9 && self.value.abs() < 10_000.0 {
            format!(".{}({})", self.name, self.value as i64)
        } else {
            format!(".{}({:.2})", self.name, self.value)
        }
    }
}

/// What a layer plays: a drum-sample step sequence or a pitched note line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerSource {
    /// `sound("bd ~ sd hh")` - sample tokens.
    Sound(Vec<String>),
    /// `note("c4 e4 g4")` - pitch tokens.
    Note(Vec<String>),
}

/// One voice of a pattern: a source plus its chained modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub source: LayerSource,

    /// Synth/instrument assigned via a chained `.sound("sine")` call
    /// (only meaningful on note layers).
    pub instrument: Option<String>,

    pub effects: Vec<Effect>,
}

impl Layer {
    #[must_use]
    pub fn sound(tokens: &[&str]) -> Self {
        Self {
            source: LayerSource::Sound(tokens.iter().map(ToString::to_string).collect()),
            instrument: None,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn note(tokens: &[&str]) -> Self {
        Self {
            source: LayerSource::Note(tokens.iter().map(ToString::to_string).collect()),
            instrument: None,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_instrument(mut self, instrument: impl Into<String>) -> Self {
        self.instrument = Some(instrument.into());
        self
    }

    #[must_use]
    pub fn with_effect(mut self, name: impl Into<String>, value: f64) -> Self {
        self.effects.push(Effect::new(name, value));
        self
    }

    #[must_use]
    pub const fn is_sound(&self) -> bool {
        matches!(self.source, LayerSource::Sound(_))
    }

    #[must_use]
    pub const fn is_note(&self) -> bool {
        matches!(self.source, LayerSource::Note(_))
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        match &self.source {
            LayerSource::Sound(tokens) | LayerSource::Note(tokens) => tokens,
        }
    }

    pub fn tokens_mut(&mut self) -> &mut Vec<String> {
        match &mut self.source {
            LayerSource::Sound(tokens) | LayerSource::Note(tokens) => tokens,
        }
    }

    /// Value of the first chained effect with the given name.
    #[must_use]
    pub fn effect(&self, name: &str) -> Option<f64> {
        self.effects.iter().find(|e| e.name == name).map(|e| e.value)
    }

    fn render(&self) -> String {
        let (call, tokens) = match &self.source {
            LayerSource::Sound(tokens) => ("sound", tokens),
            LayerSource::Note(tokens) => ("note", tokens),
        };
        let mut out = format!("{}(\"{}\")", call, tokens.join(" "));
        if let Some(instrument) = &self.instrument {
            out.push_str(&format!(".sound(\"{instrument}\")"));
        }
        for effect in &self.effects {
            out.push_str(&effect.render());
        }
        out
    }

    fn parse(segment: &str) -> Option<Self> {
        let segment = segment.trim();
        let head = LAYER_HEAD.captures(segment)?;
        let tokens: Vec<String> = head[2].split_whitespace().map(ToString::to_string).collect();
        if tokens.is_empty() {
            return None;
        }
        let source = match &head[1] {
            "sound" => LayerSource::Sound(tokens),
            _ => LayerSource::Note(tokens),
        };

        let mut layer = Self {
            source,
            instrument: None,
            effects: Vec::new(),
        };
        let rest = &segment[head[0].len()..];
        for call in CHAINED_CALL.captures_iter(rest) {
            match (&call[1], call.get(2), call.get(3)) {
                ("sound", Some(name), _) => layer.instrument = Some(name.as_str().to_string()),
                (name, _, Some(num)) => {
                    if let Ok(value) = num.as_str().parse::<f64>() {
                        layer.effects.push(Effect::new(name, value));
                    }
                }
                // Unknown string-argument call: tolerated and dropped.
                _ => {}
            }
        }
        Some(layer)
    }
}

/// Parsed structural form of an artifact's content.
///
/// Mutation operators work exclusively on this form and re-render it, so
/// none of them has to pattern-match on raw pattern text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDoc {
    pub layers: Vec<Layer>,

    /// Modifiers applied to the whole stack, e.g. a trailing `.fast(1.5)`.
    pub outer_effects: Vec<Effect>,
}

impl PatternDoc {
    /// Tolerant parse of the layered mini-notation. Returns `None` when the
    /// content is empty or contains no recognizable layer, which callers
    /// treat as a malformed (low-confidence) artifact.
    #[must_use]
    pub fn parse(content: &str) -> Option<Self> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        let (body, tail) = match content.strip_prefix("stack(") {
            Some(after) => {
                let close = matching_paren(after)?;
                (&after[..close], &after[close + 1..])
            }
            None => (content, ""),
        };

        let layers: Vec<Layer> = split_top_level(body)
            .into_iter()
            .filter_map(|segment| Layer::parse(segment))
            .collect();
        if layers.is_empty() {
            return None;
        }

        let mut outer_effects = Vec::new();
        for call in CHAINED_CALL.captures_iter(tail) {
            if let Some(num) = call.get(3) {
                if let Ok(value) = num.as_str().parse::<f64>() {
                    outer_effects.push(Effect::new(&call[1], value));
                }
            }
        }

        Some(Self {
            layers,
            outer_effects,
        })
    }

    /// Render back to pattern text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = if self.layers.len() == 1 {
            self.layers[0].render()
        } else {
            let body: Vec<String> = self.layers.iter().map(|l| format!("  {}", l.render())).collect();
            format!("stack(\n{}\n)", body.join(",\n"))
        };
        for effect in &self.outer_effects {
            out.push_str(&effect.render());
        }
        out
    }

    /// Total effect count across all layers plus stack-level modifiers.
    #[must_use]
    pub fn effect_count(&self) -> usize {
        self.layers.iter().map(|l| l.effects.len()).sum::<usize>() + self.outer_effects.len()
    }
}

/// Byte offset of the parenthesis closing a group that starts just before
/// `rest` (quote-aware depth scan).
fn matching_paren(rest: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut in_quotes = false;
    for (i, ch) in rest.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas at parenthesis depth zero, outside quotes and brackets.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0usize;
    for (i, ch) in body.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '(' | '[' if !in_quotes => depth += 1,
            ')' | ']' if !in_quotes => depth = depth.saturating_sub(1),
            ',' if !in_quotes && depth == 0 => {
                segments.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&body[start..]);
    segments
}

// --- token helpers -------------------------------------------------------

/// Token stripped of a repeat marker (`hh*3` -> `hh`).
#[must_use]
pub fn token_base(token: &str) -> &str {
    token.split('*').next().unwrap_or(token)
}

/// Repeat factor of a token (`hh*3` -> 3), if any.
#[must_use]
pub fn repeat_factor(token: &str) -> Option<u32> {
    token.split_once('*').and_then(|(_, n)| n.parse().ok())
}

/// Whether the token is the rest marker.
#[must_use]
pub fn is_rest(token: &str) -> bool {
    token == "~"
}

/// Whether the token is a bracketed simultaneous group (`[c3,e3,g3]`).
#[must_use]
pub fn is_chord(token: &str) -> bool {
    token.starts_with('[') && token.ends_with(']')
}

/// A parsed pitch token like `c4` or `eb3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pitch {
    pub letter: char,
    pub accidental: Option<char>,
    pub octave: u8,
}

impl Pitch {
    /// Parse a simple (non-chord) pitch token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let token = token_base(token);
        let mut chars = token.chars();
        let letter = chars.next()?.to_ascii_lowercase();
        if !('a'..='g').contains(&letter) {
            return None;
        }
        let rest: Vec<char> = chars.collect();
        let (accidental, octave_str): (Option<char>, &[char]) = match rest.split_first() {
            Some((&c, tail)) if c == '#' || c == 'b' => (Some(c), tail),
            _ => (None, &rest[..]),
        };
        if octave_str.len() != 1 || !octave_str[0].is_ascii_digit() {
            return None;
        }
        Some(Self {
            letter,
            accidental,
            octave: octave_str[0] as u8 - b'0',
        })
    }

    /// Absolute semitone index (c0 = 0).
    #[must_use]
    pub fn semitone(&self) -> i32 {
        let base = match self.letter {
            'c' => 0,
            'd' => 2,
            'e' => 4,
            'f' => 5,
            'g' => 7,
            'a' => 9,
            _ => 11,
        };
        let shift = match self.accidental {
            Some('#') => 1,
            Some('b') => -1,
            _ => 0,
        };
        i32::from(self.octave) * 12 + base + shift
    }

    /// Pitch class in 0..12.
    #[must_use]
    pub fn pitch_class(&self) -> u8 {
        (self.semitone().rem_euclid(12)) as u8
    }

    /// Render back to token form.
    #[must_use]
    pub fn render(&self) -> String {
        match self.accidental {
            Some(acc) => format!("{}{}{}", self.letter, acc, self.octave),
            None => format!("{}{}", self.letter, self.octave),
        }
    }
}
