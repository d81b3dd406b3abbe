//! Artist-name fingerprints used for identity matching and cache keys.
//!
//! A fingerprint folds the superficial differences between tag spellings and
//! search-result spellings (case, diacritics, spacing, punctuation) into one
//! short hex string. Two names are the same artist iff their fingerprints match.

const FINGERPRINT_LEN: usize = 10;

/// Normalized form of a name before hashing.
pub fn normalize_name(value: &str) -> String {
    let transliterated = deunicode::deunicode(value).to_lowercase();
    let compact: String = transliterated
        .chars()
        .filter(|ch| ch.is_alphanumeric())
        .collect();
    if compact.is_empty() {
        // Punctuation-only names ("!!!") keep their symbols.
        return transliterated.trim().to_string();
    }
    compact
}

/// Deterministic fingerprint of `value`.
pub fn fingerprint(value: &str) -> String {
    let digest = format!("{:x}", md5::compute(normalize_name(value)));
    digest[digest.len() - FINGERPRINT_LEN..].to_string()
}
