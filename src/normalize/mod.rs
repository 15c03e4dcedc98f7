//! Address normalization and content hashing.
//!
//! Two strengths of normalization serve two different consumers:
//!
//! - [`normalize_for_query`] only collapses whitespace. Providers receive
//!   this form so diacritics and local conventions that aid matching are
//!   preserved.
//! - [`normalize_for_hash`] additionally lowercases, folds diacritics,
//!   expands common street-type abbreviations, and drops a trailing country
//!   token. Its output is used solely as cache-key input and is never shown
//!   to users or sent to providers.
//!
//! All functions here are deterministic, pure, and total.

use sha2::{Digest, Sha256};

/// Lightly normalizes address text for provider queries: collapses repeated
/// whitespace and trims.
pub fn normalize_for_query(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonicalizes address text for cache-key hashing.
///
/// Transformations, in order: lowercase; diacritic folding; whitespace
/// collapse; street-type abbreviation expansion ("R." -> "rua",
/// "Av." -> "avenida", ...); removal of a trailing country name token.
pub fn normalize_for_hash(text: &str) -> String {
    let folded: String = text.to_lowercase().chars().map(fold_diacritic).collect();

    let mut tokens: Vec<String> = folded.split_whitespace().map(expand_abbreviation).collect();

    // Drop a trailing country token ("..., Brasil")
    if let Some(last) = tokens.last() {
        let bare = last.trim_end_matches(['.', ',']);
        if bare == "brasil" || bare == "brazil" {
            tokens.pop();
            if let Some(new_last) = tokens.last_mut() {
                *new_last = new_last.trim_end_matches([',', ';']).to_string();
            }
        }
    }

    tokens.join(" ")
}

/// SHA-256 hex digest of the hash-normalized address text.
///
/// This is the content-addressed cache key: queries differing only in case,
/// accents, abbreviation style, or spacing collapse to the same digest.
pub fn address_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_for_hash(text).as_bytes());
    hex::encode(hasher.finalize())
}

/// Folds common Latin diacritics to their base character.
///
/// A hand-rolled map keeps this dependency-free; Brazilian addresses only
/// exercise the Portuguese subset, the rest covers neighboring locales.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        _ => c,
    }
}

/// Expands a street-type abbreviation token, preserving trailing punctuation.
///
/// Input tokens are already lowercased and diacritic-folded.
fn expand_abbreviation(token: &str) -> String {
    let bare = token.trim_end_matches([',', ';']);
    let suffix = &token[bare.len()..];
    let expanded = match bare {
        "r." => "rua",
        "av." => "avenida",
        "tv." => "travessa",
        "pr." | "pc." | "pca." => "praca",
        "al." => "alameda",
        "rod." => "rodovia",
        "est." => "estrada",
        _ => return token.to_string(),
    };
    format!("{expanded}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_normalization_preserves_diacritics() {
        assert_eq!(
            normalize_for_query("  Rua   das Flores,\t100, São Paulo "),
            "Rua das Flores, 100, São Paulo"
        );
    }

    #[test]
    fn test_abbreviation_expansion_collapses_hash() {
        assert_eq!(address_hash("Rua Teste, 123"), address_hash("R. Teste, 123"));
        assert_eq!(
            address_hash("Avenida Paulista, 1000"),
            address_hash("Av. Paulista, 1000")
        );
        assert_eq!(
            address_hash("Praça da Sé"),
            address_hash("Pr. da Sé")
        );
    }

    #[test]
    fn test_case_and_accents_collapse_hash() {
        assert_eq!(
            address_hash("RUA SÃO JOÃO, 45"),
            address_hash("rua sao joao, 45")
        );
    }

    #[test]
    fn test_trailing_country_token_is_dropped() {
        assert_eq!(
            normalize_for_hash("Rua Teste, 1, São Paulo, SP, Brasil"),
            "rua teste, 1, sao paulo, sp"
        );
        assert_eq!(
            address_hash("Rua Teste, 1, São Paulo, SP, Brasil"),
            address_hash("Rua Teste, 1, São Paulo, SP")
        );
    }

    #[test]
    fn test_country_token_only_dropped_at_end() {
        // "Brasil" as part of a street name must survive
        let normalized = normalize_for_hash("Avenida Brasil, 500, Rio de Janeiro");
        assert!(normalized.contains("brasil"));
    }

    #[test]
    fn test_hash_is_stable_hex_digest() {
        let hash = address_hash("Rua Teste, 123");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        // Deterministic across calls
        assert_eq!(hash, address_hash("Rua Teste, 123"));
    }

    #[test]
    fn test_distinct_addresses_get_distinct_hashes() {
        assert_ne!(address_hash("Rua Teste, 123"), address_hash("Rua Teste, 124"));
    }
}
