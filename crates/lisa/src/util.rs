use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex_lower(&hasher.finalize())
}

pub fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(nybble_to_hex((b >> 4) & 0x0f));
        out.push(nybble_to_hex(b & 0x0f));
    }
    out
}

fn nybble_to_hex(n: u8) -> char {
    match n {
        0..=9 => (b'0' + n) as char,
        10..=15 => (b'a' + (n - 10)) as char,
        _ => '?',
    }
}

/// Short stable id for one case attempt inside a run.
pub fn record_id(run_name: &str, full_name: &str, iteration: u32) -> String {
    let mut id = sha256_hex(format!("{run_name}\n{full_name}\n{iteration}").as_bytes());
    id.truncate(16);
    id
}

pub fn unix_ms_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase() {
        assert_eq!(hex_lower(&[0x00, 0xab, 0x7f]), "00ab7f");
        assert_eq!(sha256_hex(b"").len(), 64);
    }

    #[test]
    fn record_ids_differ_per_iteration() {
        let a = record_id("run", "S.c", 0);
        let b = record_id("run", "S.c", 1);
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
        assert_eq!(a, record_id("run", "S.c", 0));
    }
}
