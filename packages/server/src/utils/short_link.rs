use rand::Rng;

/// Characters a token is drawn from: digits and lowercase letters without
/// the look-alikes `0`, `1` and `o`.
pub const ALPHABET: &[u8] = b"23456789abcdefghijklmnpqrstuvwxyz";

pub const TOKEN_LENGTH: usize = 6;

/// Upper bound on collision retries before recipe creation gives up.
pub const MAX_ATTEMPTS: usize = 32;

/// Generate a random token of `len` characters.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Canonical form used for lookups; tokens are matched case-insensitively.
pub fn normalize(token: &str) -> Option<String> {
    let token = token.trim().to_ascii_lowercase();
    if token.is_empty() || !token.bytes().all(|b| ALPHABET.contains(&b)) {
        return None;
    }
    Some(token)
}

/// Absolute URL of a short link, e.g. `https://foodgram.example/s/ab3k9z/`.
pub fn absolute_url(base: &str, token: &str) -> String {
    format!("{}/s/{}/", base.trim_end_matches('/'), token)
}
