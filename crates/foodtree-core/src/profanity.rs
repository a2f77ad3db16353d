//! Profanity detection and redaction for user-supplied text.
//!
//! Detection layers, in order:
//!
//! 1. direct case-insensitive matches against [`PROFANE_WORDS`], ignoring
//!    matches that sit inside a whitelisted word ("bass", "classic", ...);
//! 2. three or more identical word characters in a row ("fuuuck", "1111",
//!    "___"), where word characters are ASCII letters, digits and `_`;
//! 3. list words hidden by separators or glued to other text
//!    ("s h i t", "crapcock");
//! 4. three or more letter runs that are fragments of list words.
//!
//! [`sanitize_text`] only redacts layer 1. Text flagged by layers 2–4 is
//! rejected by callers, not rewritten.

use std::sync::LazyLock;

use regex::{Captures, Match, Regex};

const WHITELIST: &[&str] = &[
  "shitake", "shiitake", "scunthorpe", "cocktail", "cockpit", "assassin",
  "classic", "classical", "bass", "pass", "glass", "grass", "molasses",
];

/// Words rejected in submissions. English and Spanish.
pub const PROFANE_WORDS: &[&str] = &[
  // English
  "ass", "asshole", "bitch", "cock", "crap", "cunt", "damn", "dick", "fuck",
  "fucking", "fucker", "motherfucker", "nigga", "nigger", "piss", "prick",
  "pussy", "shit", "slut", "whore", "cum",
  // Spanish
  "puta", "puto", "mierda", "joder", "cabrón", "cabron", "pendejo", "pendeja",
  "verga", "picha", "coño", "cojones", "gilipollas", "zorra", "zorro",
  "maricón", "maricon", "marica", "subnormal", "estúpido", "estupido",
  "idiota", "imbécil", "imbecil", "tonto", "tonta", "tontito", "tontita",
];

/// Shortest list word considered by the separator layer.
const MIN_HIDDEN_LEN: usize = 3;
const FRAGMENT_THRESHOLD: usize = 3;

// ─── Patterns ────────────────────────────────────────────────────────────────

/// Case-insensitive alternation of `words`, tried in list order.
fn alternation<'a>(words: impl IntoIterator<Item = &'a str>) -> Regex {
  let alternatives: Vec<String> = words.into_iter().map(regex::escape).collect();
  Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))
    .expect("word list forms a valid pattern")
}

static PROFANITY: LazyLock<Regex> =
  LazyLock::new(|| alternation(PROFANE_WORDS.iter().copied()));

static HIDDEN: LazyLock<Regex> = LazyLock::new(|| {
  alternation(
    PROFANE_WORDS
      .iter()
      .copied()
      .filter(|w| w.chars().count() >= MIN_HIDDEN_LEN),
  )
});

static WHITELISTED: LazyLock<Regex> =
  LazyLock::new(|| alternation(WHITELIST.iter().copied()));

// `regex` has no backreferences, so each word character gets its own
// alternative.
static REPEATED: LazyLock<Regex> = LazyLock::new(|| {
  let alternatives: Vec<String> = ('a'..='z')
    .chain('0'..='9')
    .chain(['_'])
    .map(|c| format!("{c}{{3}}"))
    .collect();
  Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))
    .expect("repeat pattern is valid")
});

static SEPARATORS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[\s\-_*.]+").expect("separator pattern is valid"));

static LETTER_RUN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new("[a-z]{3,}").expect("letter-run pattern is valid"));

// ─── Layers ──────────────────────────────────────────────────────────────────

/// Whether `m` lies inside an occurrence of a whitelisted word in `text`.
fn shielded(text: &str, m: &Match<'_>) -> bool {
  WHITELISTED
    .find_iter(text)
    .any(|w| w.start() <= m.start() && m.end() <= w.end())
}

fn has_bare_match(pattern: &Regex, text: &str) -> bool {
  pattern.find_iter(text).any(|m| !shielded(text, &m))
}

/// Separators removed. Any concatenation of two list words (plural or not)
/// contains its first word, so a single-word scan also catches "crapcock".
fn has_hidden_word(text: &str) -> bool {
  let compact = SEPARATORS.replace_all(text, "");
  has_bare_match(&HIDDEN, &compact)
}

/// Number of ASCII letter runs (3+ long) that are substrings of list words.
fn fragment_count(text: &str) -> usize {
  let lower = text.to_lowercase();
  LETTER_RUN
    .find_iter(&lower)
    .filter(|run| PROFANE_WORDS.iter().any(|w| w.contains(run.as_str())))
    .count()
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Whether `text` contains profanity or an obfuscated form of it.
pub fn contains_profanity(text: &str) -> bool {
  if text.is_empty() {
    return false;
  }
  if WHITELIST.contains(&text.to_lowercase().as_str()) {
    return false;
  }

  has_bare_match(&PROFANITY, text)
    || REPEATED.is_match(text)
    || has_hidden_word(text)
    || fragment_count(text) >= FRAGMENT_THRESHOLD
}

/// Replace each direct match of a list word with one `*` per character.
///
/// Matching is leftmost-first in list order, so "asshole" becomes
/// "***hole". Matches inside a whitelisted word are kept. Obfuscated forms
/// are not rewritten.
pub fn sanitize_text(text: &str) -> String {
  PROFANITY
    .replace_all(text, |caps: &Captures<'_>| match caps.get(0) {
      Some(m) if !shielded(text, &m) => "*".repeat(m.as_str().chars().count()),
      Some(m) => m.as_str().to_owned(),
      None => String::new(),
    })
    .into_owned()
}
