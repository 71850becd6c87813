use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x8b5ad4a0c7d8e9f1;

/// Seeded xxh3 hasher with a fixed byte encoding.
///
/// Output only depends on the values written, never on process state, so identifiers derived
/// from it are identical across runs, threads and machines.
pub(crate) struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    pub(crate) fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    pub(crate) fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_f64(&mut self, v: f64) {
        // Fold -0.0 so equal values hash equally.
        let v = if v == 0.0 { 0.0 } else { v };
        self.write_u64(v.to_bits());
    }

    /// Length-prefixed so that adjacent strings cannot alias.
    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.write_bytes(s.as_bytes());
    }

    pub(crate) fn write_opt_f64(&mut self, v: Option<f64>) {
        match v {
            Some(v) => {
                self.write_u8(1);
                self.write_f64(v);
            }
            None => self.write_u8(0),
        }
    }

    pub(crate) fn finish(self) -> u64 {
        self.inner.digest()
    }
}

/// `Prefix_<16 hex digits>` identifier for a content hash.
pub(crate) fn content_id(prefix: &str, hash: u64) -> String {
    format!("{prefix}_{hash:016x}")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
