use sha2::{Digest, Sha256};

use super::HubCatalog;

const SEPARATOR: &[u8] = b"||";

/// Reduces the SHA-256 digest of `parts` modulo `modulo`
///
/// Each part is followed by `||` before hashing and the first 8 bytes of
/// the digest are read as a big-endian `u64`. Returns `None` if `modulo` is 0.
pub fn deterministic_index<I, S>(parts: I, modulo: usize) -> Option<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    if modulo == 0 {
        return None;
    }
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_ref());
        hasher.update(SEPARATOR);
    }
    let digest = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    Some((u64::from_be_bytes(prefix) % modulo as u64) as usize)
}

/// Hub of a `city` row picked from its catalog entry
///
/// Cities outside the catalog (or with an empty entry) keep their own name.
pub fn assign_hub<'a>(catalog: &'a HubCatalog, city: &'a str, time: &str, count: &str) -> &'a str {
    catalog
        .hubs(city)
        .and_then(|hubs| {
            deterministic_index([city, time, count], hubs.len()).map(|idx| hubs[idx].as_str())
        })
        .unwrap_or(city)
}
