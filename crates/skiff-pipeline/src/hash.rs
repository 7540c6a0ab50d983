//! Content hashing for cache-busting filenames.

use sha2::{Digest, Sha512};

/// Length of the hash fragment embedded in filenames.
const HASH_LEN: usize = 8;

/// Short hex digest of the file contents.
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha512::digest(bytes);

    let mut hex = String::with_capacity(HASH_LEN);
    for byte in digest.iter().take(HASH_LEN.div_ceil(2)) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex.truncate(HASH_LEN);
    hex
}

/// Build a `<stem>.<hash>.<ext>` filename for the given contents.
pub fn hashed_filename(stem: &str, ext: &str, bytes: &[u8]) -> String {
    format!("{stem}.{}.{ext}", content_hash(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(content_hash(b"body {}"), content_hash(b"body {}"));
    }

    #[test]
    fn hash_tracks_content() {
        assert_ne!(content_hash(b"a"), content_hash(b"b"));
    }

    #[test]
    fn hash_fragment_has_fixed_length() {
        assert_eq!(content_hash(b"").len(), HASH_LEN);
        assert_eq!(content_hash(b"anything at all").len(), HASH_LEN);
    }

    #[test]
    fn filename_embeds_hash_between_stem_and_extension() {
        let name = hashed_filename("app", "js", b"console.log(1);");
        let parts: Vec<&str> = name.split('.').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "app");
        assert_eq!(parts[1].len(), HASH_LEN);
        assert_eq!(parts[2], "js");
    }
}
