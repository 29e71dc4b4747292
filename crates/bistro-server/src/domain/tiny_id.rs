//! Public-facing short identifiers, distinct from the internal row ids.

use rand::Rng;

pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const LENGTH: usize = 8;

/// Draw an 8-character identifier uniformly from A-Z0-9.
///
/// Pure generation; uniqueness against existing restaurants is the
/// caller's problem (`thread_rng` is a CSPRNG, collisions are ~1.4e-12
/// per call but still possible).
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
