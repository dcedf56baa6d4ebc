use crate::types::{is_mask_token, mask_token_spans, Category};
use regex::{Captures, Regex};
use zeroize::Zeroize;

/// How a rule turns a match into replacement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskStrategy {
    /// Whole match becomes `token`
    Fixed { token: String },
    /// Capture group `value` becomes `placeholder`; the key is copied through
    FieldPreserving { placeholder: String },
    /// Like `FieldPreserving`, but keys on the policy allowlist are skipped
    Conditional {
        allowlist: Vec<String>,
        fallback: String,
    },
}

impl MaskStrategy {
    pub fn replacement(&self) -> &str {
        match self {
            Self::Fixed { token } => token,
            Self::FieldPreserving { placeholder } => placeholder,
            Self::Conditional { fallback, .. } => fallback,
        }
    }
}

/// One value span a rule wants replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub category: Category,
    pub start: usize,      // UTF-8 byte offset (NOT char index)
    pub end: usize,        // UTF-8 byte offset
    pub original: String,  // Original text – will be zeroized on drop
    pub masked: String,
}

impl Zeroize for Detection {
    fn zeroize(&mut self) {
        self.original.zeroize();
    }
}

impl Drop for Detection {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// A single registry entry.
///
/// Key/value rules must expose named groups `key` (or `qkey`) and one of
/// `value`, `dq`, `sq`, `bare`; whichever participated is the value span.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub category: Category,
    pub name: String,
    matcher: Regex,
    strategy: MaskStrategy,
    /// Rule only fires on lines this also matches
    context: Option<Regex>,
}

const VALUE_GROUPS: [&str; 4] = ["value", "dq", "sq", "bare"];
const KEY_GROUPS: [&str; 2] = ["qkey", "key"];

impl PatternRule {
    pub fn new(category: Category, name: impl Into<String>, matcher: Regex, strategy: MaskStrategy) -> Self {
        Self {
            category,
            name: name.into(),
            matcher,
            strategy,
            context: None,
        }
    }

    pub fn with_context(mut self, context: Regex) -> Self {
        self.context = Some(context);
        self
    }

    pub fn strategy(&self) -> &MaskStrategy {
        &self.strategy
    }

    /// Find every span on `line` this rule masks, sorted by `start`,
    /// non-overlapping.
    ///
    /// Values that are empty, already a `[REDACTED_*]` token, or equal to
    /// this rule's own replacement are left alone. A match that starts or
    /// ends against a mask token is dropped as well: its boundaries only
    /// exist because an earlier replacement created them.
    pub fn detect(&self, line: &str) -> Vec<Detection> {
        let tokens = mask_token_spans(line);

        if let Some(context) = &self.context {
            if !context.is_match(&blank_spans(line, &tokens)) {
                return Vec::new();
            }
        }

        let replacement = self.strategy.replacement();
        let mut detections = Vec::new();
        let mut pos = 0;

        while let Some(caps) = self.matcher.captures_at(line, pos) {
            let Some(whole) = caps.get(0) else { break };

            let bare_end = match self.strategy {
                MaskStrategy::Fixed { .. } => None,
                _ => caps
                    .name("bare")
                    .map(|bare| trim_trailing_key(line, bare.start(), bare.end())),
            };
            let match_end = bare_end.unwrap_or(whole.end());

            let span = match &self.strategy {
                MaskStrategy::Fixed { .. } => Some((whole.start(), whole.end())),
                MaskStrategy::FieldPreserving { .. } => value_span(&caps, bare_end),
                MaskStrategy::Conditional { allowlist, .. } => {
                    let key = KEY_GROUPS.iter().find_map(|g| caps.name(g));
                    match key {
                        Some(key) if is_allowlisted(allowlist, key.as_str()) => None,
                        _ => value_span(&caps, bare_end),
                    }
                }
            };

            if let Some((start, end)) = span {
                let value = &line[start..end];
                let skip = value.is_empty()
                    || value == replacement
                    || is_mask_token(value)
                    || borders_mask_token(&tokens, whole.start(), match_end);
                if !skip {
                    detections.push(Detection {
                        category: self.category,
                        start,
                        end,
                        original: value.to_string(),
                        masked: replacement.to_string(),
                    });
                }
            }

            pos = if match_end > whole.start() {
                match_end
            } else {
                match line[whole.end()..].chars().next() {
                    Some(c) => whole.end() + c.len_utf8(),
                    None => break,
                }
            };
        }

        detections
    }
}

fn value_span(caps: &Captures<'_>, bare_end: Option<usize>) -> Option<(usize, usize)> {
    if let (Some(bare), Some(end)) = (caps.name("bare"), bare_end) {
        return Some((bare.start(), end));
    }
    VALUE_GROUPS
        .iter()
        .find_map(|g| caps.name(g))
        .map(|m| (m.start(), m.end()))
}

/// A multi-word bare value ends before the word that opens the next
/// `key=` or `key:` pair.
fn trim_trailing_key(line: &str, start: usize, end: usize) -> usize {
    if !matches!(line[end..].chars().next(), Some('=' | ':')) {
        return end;
    }
    let value = &line[start..end];
    match value.rfind(char::is_whitespace) {
        Some(idx) => start + value[..idx].trim_end().len(),
        None => end,
    }
}

/// The match touches a token edge or straddles one. Tokens wholly inside
/// the match are fine.
fn borders_mask_token(tokens: &[(usize, usize)], start: usize, end: usize) -> bool {
    tokens.iter().any(|&(t_start, t_end)| {
        t_end == start
            || t_start == end
            || (t_start < start && start < t_end)
            || (t_start < end && end < t_end)
    })
}

/// `line` with every token replaced by spaces, so keywords inside tokens
/// never satisfy a context guard.
fn blank_spans(line: &str, tokens: &[(usize, usize)]) -> String {
    let mut blanked = line.to_string();
    for &(start, end) in tokens.iter().rev() {
        blanked.replace_range(start..end, &" ".repeat(end - start));
    }
    blanked
}

fn is_allowlisted(allowlist: &[String], key: &str) -> bool {
    let key = key.trim_matches(|c| c == '"' || c == '\'');
    allowlist.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// Splice detections into `text`. Detections must be sorted and disjoint.
pub fn apply_redactions(text: &str, detections: &[Detection]) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_idx = 0;

    for detection in detections {
        if detection.start > last_idx {
            result.push_str(&text[last_idx..detection.start]);
        }

        result.push_str(&detection.masked);

        last_idx = detection.end;
    }

    if last_idx < text.len() {
        result.push_str(&text[last_idx..]);
    }

    result
}
