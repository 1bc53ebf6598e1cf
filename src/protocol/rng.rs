use crate::MASK_KEY_CACHE_ENTRIES;

/// xorshift128+ generator.
///
/// Fast and non-cryptographic. Good enough for masking keys, which only need to be hard to
/// predict for intermediaries, not for an attacker.
#[derive(Debug, Clone)]
pub struct XorShift128Plus {
    s: [u64; 2],
}

impl XorShift128Plus {
    /// Seeds the generator. An all-zero seed would only ever produce zeros, so `(0, 0)`
    /// becomes `(0, 1)`.
    #[must_use]
    pub fn new(seed0: u64, seed1: u64) -> Self {
        let seed1 = if seed0 == 0 && seed1 == 0 { 1 } else { seed1 };
        Self { s: [seed0, seed1] }
    }

    /// Seeds from the thread-local OS-backed RNG. Slow, call once per generator.
    #[must_use]
    pub fn from_entropy() -> Self { Self::new(rand::random(), rand::random()) }

    pub fn next_u64(&mut self) -> u64 {
        let [mut x, y] = self.s;
        self.s[0] = y;
        x ^= x << 23;
        self.s[1] = x ^ y ^ (x >> 17) ^ (y >> 26);
        self.s[1].wrapping_add(y)
    }

    /// Fills `buf` with successive outputs in little-endian byte order. A trailing partial
    /// word takes the low bytes of one extra output.
    pub fn fill_bytes(&mut self, buf: &mut [u8]) {
        let mut words = buf.chunks_exact_mut(8);
        for word in &mut words {
            word.copy_from_slice(&self.next_u64().to_le_bytes());
        }
        let tail = words.into_remainder();
        if !tail.is_empty() {
            let n = tail.len();
            tail.copy_from_slice(&self.next_u64().to_le_bytes()[..n]);
        }
    }

    #[must_use]
    pub fn state(&self) -> [u64; 2] { self.s }
}

/// Hands out 4-byte masking keys from a small cache refilled in one batch.
#[derive(Debug, Clone)]
pub struct MaskKeyGenerator {
    rng: XorShift128Plus,
    cache: [u8; MASK_KEY_CACHE_ENTRIES * 4],
    pos: usize,
}

impl MaskKeyGenerator {
    #[must_use]
    pub fn new() -> Self { Self::from_rng(XorShift128Plus::from_entropy()) }

    /// Deterministic generator, for reproducible frames.
    #[must_use]
    pub fn from_seed(seed0: u64, seed1: u64) -> Self {
        Self::from_rng(XorShift128Plus::new(seed0, seed1))
    }

    fn from_rng(rng: XorShift128Plus) -> Self {
        let mut keys = Self {
            rng,
            cache: [0; MASK_KEY_CACHE_ENTRIES * 4],
            pos: 0,
        };
        keys.refill();
        keys
    }

    /// Discards whatever is left in the cache and generates a fresh batch.
    pub fn refill(&mut self) {
        self.rng.fill_bytes(&mut self.cache);
        self.pos = 0;
        tracing::trace!(entries = MASK_KEY_CACHE_ENTRIES, "mask key cache refilled");
    }

    pub fn next_key(&mut self) -> [u8; 4] {
        if self.pos >= self.cache.len() {
            self.refill();
        }
        let mut key = [0; 4];
        key.copy_from_slice(&self.cache[self.pos..self.pos + 4]);
        self.pos += 4;
        key
    }
}

impl Default for MaskKeyGenerator {
    fn default() -> Self { Self::new() }
}
