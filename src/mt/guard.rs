/// Placeholder Guard for protecting fixed tokens and template placeholders during machine translation
///
/// Before a string is sent to the translation service, every protected
/// substring is swapped for a numeric marker that translation engines pass
/// through untouched. After translation the markers are swapped back.
///
/// Marker format: `8080` + two-digit pattern index + three-digit occurrence,
/// nine digits in total. Literal patterns always use occurrence `000` and map
/// back through the guard's static table; regex matches use occurrences
/// `001..=999` and map back through the [`MaskedText`] returned by that one
/// `mask` call.
///
/// ```text
/// "Press OK to open {{name}}"  ->  "Press 808001000 to open 808002001"
/// ```
///
/// If the service alters the digits of a marker, that marker is not restored.
/// Markers glued to other digits are ambiguous; the leftmost known marker wins.
use crate::mt::error::{MtError, MtResult};
use regex::Regex;
use std::collections::HashMap;

const MARKER_PREFIX: &str = "8080";
/// Prefix + two-digit pattern index + three-digit occurrence
const MARKER_LEN: usize = 9;
const MAX_PATTERNS: usize = 100;
const MAX_OCCURRENCES: usize = 999;

/// A substring that must survive translation unchanged
#[derive(Debug, Clone)]
pub enum ProtectedPattern {
    /// Exact text, replaced wherever it appears
    Literal(String),
    /// Every match is protected individually
    Regex(Regex),
}

impl ProtectedPattern {
    pub fn literal(text: &str) -> Self {
        ProtectedPattern::Literal(text.to_string())
    }

    pub fn regex(pattern: &str) -> MtResult<Self> {
        Regex::new(pattern)
            .map(ProtectedPattern::Regex)
            .map_err(|e| MtError::ConfigError(format!("Invalid protected pattern '{}': {}", pattern, e)))
    }
}

/// Ordered list of protected patterns; the position of a pattern is its marker index
#[derive(Debug, Clone, Default)]
pub struct PlaceholderSpec {
    patterns: Vec<ProtectedPattern>,
}

impl PlaceholderSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patterns protected in the portal's translation files: the `PA` and
    /// `OK` literals and `{{ ... }}` interpolation placeholders
    pub fn portal_default() -> MtResult<Self> {
        Ok(Self::new()
            .with_literal("PA")
            .with_literal("OK")
            .with_regex(r"\{\{.*?\}\}")?)
    }

    pub fn with_literal(mut self, text: &str) -> Self {
        self.patterns.push(ProtectedPattern::literal(text));
        self
    }

    pub fn with_regex(mut self, pattern: &str) -> MtResult<Self> {
        self.patterns.push(ProtectedPattern::regex(pattern)?);
        Ok(self)
    }

    pub fn patterns(&self) -> &[ProtectedPattern] {
        &self.patterns
    }
}

/// Text with protected substrings replaced by markers
///
/// Holds the reverse mapping for regex matches of this call only; it is
/// dropped together with the string it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedText {
    /// What is sent to the translation service
    pub text: String,
    restorations: HashMap<String, String>,
}

/// A protected span selected during masking
struct Span {
    start: usize,
    end: usize,
    pattern_index: usize,
}

#[derive(Debug, Clone)]
pub struct PlaceholderGuard {
    spec: PlaceholderSpec,
    /// Literal marker -> literal text
    literal_markers: HashMap<String, String>,
    marker_re: Regex,
}

impl PlaceholderGuard {
    pub fn new(spec: PlaceholderSpec) -> MtResult<Self> {
        if spec.patterns.len() > MAX_PATTERNS {
            return Err(MtError::ConfigError(format!(
                "At most {} protected patterns are supported, got {}",
                MAX_PATTERNS,
                spec.patterns.len()
            )));
        }

        let literal_markers = spec
            .patterns
            .iter()
            .enumerate()
            .filter_map(|(index, pattern)| match pattern {
                ProtectedPattern::Literal(text) if !text.is_empty() => {
                    Some((marker(index, 0), text.clone()))
                }
                _ => None,
            })
            .collect();

        let marker_re = Regex::new(&format!(r"{}\d{{5}}", MARKER_PREFIX))
            .map_err(|e| MtError::ConfigError(format!("Invalid marker pattern: {}", e)))?;

        Ok(Self {
            spec,
            literal_markers,
            marker_re,
        })
    }

    /// Replace every protected substring of `text` with its marker
    ///
    /// Candidate matches from all patterns are collected first; overlaps are
    /// resolved leftmost-longest, ties going to the lower pattern index. So
    /// `{{OK}}` is protected as one placeholder rather than as the `OK` literal.
    pub fn mask(&self, text: &str) -> MaskedText {
        if self.marker_re.is_match(text) {
            tracing::warn!(
                "Text already contains marker-like digits, restoration may alter them: {}",
                text
            );
        }

        let spans = self.select_spans(text);

        let mut masked = String::with_capacity(text.len());
        let mut restorations = HashMap::new();
        // Per-pattern occurrence counters and matched text -> marker, so equal
        // matches share one marker
        let mut counters: HashMap<usize, usize> = HashMap::new();
        let mut assigned: HashMap<(usize, &str), String> = HashMap::new();
        let mut cursor = 0;

        for span in spans {
            let original = &text[span.start..span.end];
            let token = match &self.spec.patterns[span.pattern_index] {
                ProtectedPattern::Literal(_) => marker(span.pattern_index, 0),
                ProtectedPattern::Regex(_) => {
                    if let Some(existing) = assigned.get(&(span.pattern_index, original)) {
                        existing.clone()
                    } else {
                        let counter = counters.entry(span.pattern_index).or_insert(0);
                        if *counter >= MAX_OCCURRENCES {
                            tracing::warn!(
                                "Too many matches for protected pattern {}, leaving '{}' unprotected",
                                span.pattern_index,
                                original
                            );
                            continue;
                        }
                        *counter += 1;
                        let token = marker(span.pattern_index, *counter);
                        assigned.insert((span.pattern_index, original), token.clone());
                        restorations.insert(token.clone(), original.to_string());
                        token
                    }
                }
            };

            masked.push_str(&text[cursor..span.start]);
            masked.push_str(&token);
            cursor = span.end;
        }
        masked.push_str(&text[cursor..]);

        MaskedText {
            text: masked,
            restorations,
        }
    }

    /// Put the protected substrings back into a translated string
    ///
    /// Markers the service moved around are restored at their new position.
    /// Only markers of this call or of a literal pattern are replaced, so a
    /// marker glued to surrounding digits (`80` + `808002001`) is still found.
    /// Digits that form no known marker are left as they are.
    pub fn unmask(&self, translated: &str, masked: &MaskedText) -> String {
        let mut restored = String::with_capacity(translated.len());
        let mut rest = translated;

        while let Some(offset) = rest.find(MARKER_PREFIX) {
            let (before, candidate) = rest.split_at(offset);
            restored.push_str(before);

            let known = candidate.get(..MARKER_LEN).and_then(|token| {
                masked
                    .restorations
                    .get(token)
                    .or_else(|| self.literal_markers.get(token))
            });
            match known {
                Some(original) => {
                    restored.push_str(original);
                    rest = &candidate[MARKER_LEN..];
                }
                None => {
                    // Slide by one digit; a known marker may start inside this window
                    restored.push_str(&candidate[..1]);
                    rest = &candidate[1..];
                }
            }
        }
        restored.push_str(rest);
        restored
    }

    fn select_spans(&self, text: &str) -> Vec<Span> {
        let mut candidates = Vec::new();
        for (pattern_index, pattern) in self.spec.patterns.iter().enumerate() {
            match pattern {
                ProtectedPattern::Literal(literal) => {
                    if literal.is_empty() {
                        continue;
                    }
                    candidates.extend(text.match_indices(literal.as_str()).map(|(start, m)| Span {
                        start,
                        end: start + m.len(),
                        pattern_index,
                    }));
                }
                ProtectedPattern::Regex(re) => {
                    candidates.extend(re.find_iter(text).filter(|m| !m.is_empty()).map(|m| Span {
                        start: m.start(),
                        end: m.end(),
                        pattern_index,
                    }));
                }
            }
        }

        candidates.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(b.end.cmp(&a.end))
                .then(a.pattern_index.cmp(&b.pattern_index))
        });

        let mut selected: Vec<Span> = Vec::new();
        for span in candidates {
            let free = selected.last().is_none_or(|last| span.start >= last.end);
            if free {
                selected.push(span);
            }
        }
        selected
    }
}

fn marker(pattern_index: usize, occurrence: usize) -> String {
    format!("{}{:02}{:03}", MARKER_PREFIX, pattern_index, occurrence)
}
