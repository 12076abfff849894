//! Prompt fingerprinting, so logs can tell which system prompt was live.

use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a prompt string.
pub fn hash_prompt(prompt: &str) -> String {
    Sha256::digest(prompt.as_bytes())
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// First 12 hex characters of [`hash_prompt`], for log lines.
pub fn short_hash(prompt: &str) -> String {
    let mut hash = hash_prompt(prompt);
    hash.truncate(12);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_prompt_stable() {
        let first = hash_prompt("Você é Saulo");
        let second = hash_prompt("Você é Saulo");
        let different = hash_prompt("Você é outro");

        assert_eq!(first, second);
        assert_ne!(first, different);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_short_hash_is_prefix() {
        let prompt = "persona";
        assert!(hash_prompt(prompt).starts_with(&short_hash(prompt)));
        assert_eq!(short_hash(prompt).len(), 12);
    }
}
