use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Canonical lowercase, alias-resolved form of a skill, degree or role phrase
///
/// Only the normalizer produces these, so two tokens compare equal exactly
/// when their source phrases are considered the same thing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedToken(String);

impl NormalizedToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Space separated words of the token
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|w| !w.is_empty())
    }
}

impl fmt::Display for NormalizedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur while building an alias table
#[derive(Debug, Error)]
pub enum AliasTableError {
    #[error("Failed to read alias file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid alias file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Canonical token '{0}' is empty after normalization")]
    EmptyCanonical(String),

    #[error("Alias '{variant}' maps to both '{first}' and '{second}'")]
    Conflict {
        variant: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Default, Deserialize)]
struct AliasFile {
    #[serde(default)]
    aliases: BTreeMap<String, Vec<String>>,
}

/// Mapping from raw phrase variants to canonical tokens
///
/// Built once at startup and never mutated afterwards. Every canonical token
/// maps to itself, which keeps normalization idempotent.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, NormalizedToken>,
}

impl AliasTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from `canonical -> [variants]` groups
    pub fn from_groups<I, V>(groups: I) -> Result<Self, AliasTableError>
    where
        I: IntoIterator<Item = (String, V)>,
        V: IntoIterator<Item = String>,
    {
        let mut resolved = Vec::new();
        for (canonical, variants) in groups {
            let token = canonicalize(&canonical);
            if token.is_empty() {
                return Err(AliasTableError::EmptyCanonical(canonical));
            }
            resolved.push((NormalizedToken(token), variants.into_iter().collect::<Vec<_>>()));
        }

        let mut entries: HashMap<String, NormalizedToken> = HashMap::new();

        // Canonicals first, so no variant can redirect a canonical elsewhere
        for (canonical, _) in &resolved {
            insert_strict(&mut entries, canonical.0.clone(), canonical)?;
        }
        for (canonical, variants) in &resolved {
            for variant in variants {
                let key = fold(variant);
                if !key.is_empty() {
                    insert_strict(&mut entries, key, canonical)?;
                }
            }
        }
        // Punctuation-stripped spellings only fill gaps ("NodeJS" for "node.js")
        for (canonical, variants) in &resolved {
            for variant in variants {
                let key = canonicalize(variant);
                if !key.is_empty() && has_only_internal_punctuation(variant) {
                    entries.entry(key).or_insert_with(|| canonical.clone());
                }
            }
        }

        Ok(Self { entries })
    }

    /// Parse a TOML document with an `[aliases]` table
    pub fn from_toml_str(source: &str) -> Result<Self, AliasTableError> {
        let file: AliasFile = toml::from_str(source)?;
        Self::from_groups(file.aliases)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AliasTableError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| AliasTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Combine this table's groups with additional ones
    pub fn merged_with<I>(self, extra: I) -> Result<Self, AliasTableError>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (variant, canonical) in self.entries {
            groups.entry(canonical.0).or_default().push(variant);
        }
        for (canonical, variants) in extra {
            groups
                .entry(canonicalize(&canonical))
                .or_default()
                .extend(variants);
        }
        Self::from_groups(groups)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, key: &str) -> Option<&NormalizedToken> {
        self.entries.get(key)
    }
}

fn insert_strict(
    entries: &mut HashMap<String, NormalizedToken>,
    key: String,
    canonical: &NormalizedToken,
) -> Result<(), AliasTableError> {
    match entries.get(&key) {
        Some(existing) if existing != canonical => Err(AliasTableError::Conflict {
            variant: key,
            first: existing.0.clone(),
            second: canonical.0.clone(),
        }),
        Some(_) => Ok(()),
        None => {
            entries.insert(key, canonical.clone());
            Ok(())
        }
    }
}

/// Phrase normalizer backed by a shared, read-only alias table
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    aliases: Arc<AliasTable>,
}

impl Normalizer {
    pub fn new(aliases: Arc<AliasTable>) -> Self {
        Self { aliases }
    }

    pub fn without_aliases() -> Self {
        Self::default()
    }

    /// Normalize a raw phrase into its canonical token
    ///
    /// Total and deterministic: unknown phrases normalize to their own
    /// lowercased, punctuation-stripped form.
    pub fn normalize(&self, raw: &str) -> NormalizedToken {
        if let Some(canonical) = self.aliases.lookup(&fold(raw)) {
            return canonical.clone();
        }
        let stripped = canonicalize(raw);
        match self.aliases.lookup(&stripped) {
            Some(canonical) => canonical.clone(),
            None => NormalizedToken(stripped),
        }
    }

    /// Normalize a list of phrases into a deduplicated set, dropping phrases
    /// that normalize to nothing
    pub fn normalize_all<S: AsRef<str>>(&self, raw: &[S]) -> BTreeSet<NormalizedToken> {
        raw.iter()
            .map(|phrase| self.normalize(phrase.as_ref()))
            .filter(|token| !token.is_empty())
            .collect()
    }

    /// Normalize a required phrase that is matched word by word against free text
    pub fn key_phrase(&self, raw: &str) -> KeyPhrase {
        let token = self.normalize(raw);
        let words = self.resolve_words(token.as_str()).into_iter().collect();
        KeyPhrase { token, words }
    }

    pub fn key_phrases<S: AsRef<str>>(&self, raw: &[S]) -> BTreeSet<KeyPhrase> {
        raw.iter()
            .map(|phrase| self.key_phrase(phrase.as_ref()))
            .filter(|phrase| !phrase.token.is_empty())
            .collect()
    }

    /// Words a free-text phrase (a role, an organization, a field of study)
    /// offers for matching: its own words plus the words of every alias
    /// found inside it, so "ML Engineer" also offers "machine" and "learning"
    pub fn text_words(&self, raw: &str) -> BTreeSet<String> {
        let mut words: BTreeSet<String> = canonicalize(raw)
            .split(' ')
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        words.extend(self.resolve_words(raw));
        words
    }

    /// Replace aliased word runs with their canonical words, longest run first
    fn resolve_words(&self, raw: &str) -> Vec<String> {
        let folded = fold(raw);
        let words: Vec<&str> = folded.split(' ').filter(|w| !w.is_empty()).collect();
        let mut resolved = Vec::with_capacity(words.len());

        let mut i = 0;
        while i < words.len() {
            let longest = (1..=MAX_ALIAS_WORDS.min(words.len() - i))
                .rev()
                .find_map(|n| self.lookup_run(&words[i..i + n]).map(|c| (n, c)));

            match longest {
                Some((n, canonical)) => {
                    resolved.extend(canonical.words().map(str::to_string));
                    i += n;
                }
                None => {
                    let plain = canonicalize(words[i]);
                    resolved.extend(plain.split(' ').filter(|w| !w.is_empty()).map(str::to_string));
                    i += 1;
                }
            }
        }

        resolved
    }

    fn lookup_run(&self, run: &[&str]) -> Option<&NormalizedToken> {
        let joined = run.join(" ");
        self.aliases
            .lookup(&joined)
            .or_else(|| self.aliases.lookup(&canonicalize(&joined)))
    }
}

/// Longest word run looked up in the alias table when scanning free text
const MAX_ALIAS_WORDS: usize = 4;

/// A required phrase with its alias-resolved words
///
/// Reported as `token`; matched when every one of `words` appears among the
/// [`Normalizer::text_words`] of the text it is compared with.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPhrase {
    pub token: NormalizedToken,
    pub words: BTreeSet<String>,
}

impl KeyPhrase {
    pub fn is_within(&self, text_words: &BTreeSet<String>) -> bool {
        self.words.is_subset(text_words)
    }
}

/// True when every punctuation mark sits between two alphanumerics, as in
/// "node.js" but not "c++" or ".net"
fn has_only_internal_punctuation(raw: &str) -> bool {
    let chars: Vec<char> = raw.trim().chars().collect();
    chars.iter().enumerate().all(|(i, &c)| {
        if c.is_alphanumeric() || c.is_whitespace() {
            return true;
        }
        let before = i > 0 && chars[i - 1].is_alphanumeric();
        let after = chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
        before && after
    })
}

/// Normalize without any alias table
pub fn normalize(raw: &str) -> NormalizedToken {
    NormalizedToken(canonicalize(raw))
}

/// Lowercase, trim and collapse internal whitespace
fn fold(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `fold`, additionally dropping punctuation except hyphens between two
/// alphanumerics
fn canonicalize(raw: &str) -> String {
    let lowered: Vec<char> = raw.to_lowercase().chars().collect();
    let mut kept = String::with_capacity(lowered.len());

    for (i, &c) in lowered.iter().enumerate() {
        if c.is_alphanumeric() {
            kept.push(c);
        } else if c.is_whitespace() {
            kept.push(' ');
        } else if c == '-' {
            let before = i > 0 && lowered[i - 1].is_alphanumeric();
            let after = lowered.get(i + 1).is_some_and(|n| n.is_alphanumeric());
            if before && after {
                kept.push('-');
            }
        }
    }

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
