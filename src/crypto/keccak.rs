//! Keccak-256
//!
//! The original Keccak submission as used by the EVM and TRON, not NIST
//! SHA3-256. The two differ only in the domain padding byte (`0x01` here,
//! `0x06` for SHA3), so a mismatch still yields a plausible-looking digest.
//!
//! Sponge parameters: 1600-bit state, 1088-bit rate (136 bytes), 256-bit output.

/// Bytes absorbed per permutation (1600 - 2 * 256 bits)
pub const KECCAK256_RATE: usize = 136;

/// Length of a Keccak-256 digest
pub const DIGEST_LEN: usize = 32;

const ROUNDS: usize = 24;

// MARK: - Permutation Tables

const ROUND_CONSTANTS: [u64; ROUNDS] = [
    0x0000000000000001, 0x0000000000008082, 0x800000000000808a,
    0x8000000080008000, 0x000000000000808b, 0x0000000080000001,
    0x8000000080008081, 0x8000000000008009, 0x000000000000008a,
    0x0000000000000088, 0x0000000080008009, 0x000000008000000a,
    0x000000008000808b, 0x800000000000008b, 0x8000000000008089,
    0x8000000000008003, 0x8000000000008002, 0x8000000000000080,
    0x000000000000800a, 0x800000008000000a, 0x8000000080008081,
    0x8000000000008080, 0x0000000080000001, 0x8000000080008008,
];

/// Lane visited at each step of the combined rho/pi walk
const PI_LANES: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4,
    15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

/// Rotation applied to the lane moved at each step
const RHO_OFFSETS: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14,
    27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];

/// Keccak-f[1600] over 25 little-endian lanes
fn keccak_f1600(state: &mut [u64; 25]) {
    let mut columns = [0u64; 5];

    for round_constant in ROUND_CONSTANTS {
        // Theta
        for x in 0..5 {
            columns[x] = state[x] ^ state[x + 5] ^ state[x + 10] ^ state[x + 15] ^ state[x + 20];
        }
        for x in 0..5 {
            let t = columns[(x + 4) % 5] ^ columns[(x + 1) % 5].rotate_left(1);
            for y in (0..25).step_by(5) {
                state[y + x] ^= t;
            }
        }

        // Rho + Pi
        let mut carried = state[1];
        for (&lane, &offset) in PI_LANES.iter().zip(RHO_OFFSETS.iter()) {
            let next = state[lane];
            state[lane] = carried.rotate_left(offset);
            carried = next;
        }

        // Chi
        for y in (0..25).step_by(5) {
            let row = [state[y], state[y + 1], state[y + 2], state[y + 3], state[y + 4]];
            for x in 0..5 {
                state[y + x] = row[x] ^ (!row[(x + 1) % 5] & row[(x + 2) % 5]);
            }
        }

        // Iota
        state[0] ^= round_constant;
    }
}

// MARK: - Sponge

/// Incremental Keccak-256 hasher
///
/// Each instance owns its state; clone it to fork a computation.
#[derive(Clone)]
pub struct Keccak256 {
    state: [u64; 25],
    buffer: [u8; KECCAK256_RATE],
    buffered: usize,
}

impl Default for Keccak256 {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Keccak256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keccak256")
            .field("buffered", &self.buffered)
            .finish_non_exhaustive()
    }
}

impl Keccak256 {
    pub fn new() -> Self {
        Self {
            state: [0u64; 25],
            buffer: [0u8; KECCAK256_RATE],
            buffered: 0,
        }
    }

    /// Absorb more input
    pub fn update(&mut self, mut data: &[u8]) -> &mut Self {
        while !data.is_empty() {
            let take = (KECCAK256_RATE - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];

            if self.buffered == KECCAK256_RATE {
                self.absorb_buffer();
            }
        }
        self
    }

    /// Pad, absorb the final block and squeeze the digest
    pub fn finalize(mut self) -> [u8; DIGEST_LEN] {
        // Multi-rate padding. With one byte left both bits land in it (0x81).
        self.buffer[self.buffered..].fill(0);
        self.buffer[self.buffered] ^= 0x01;
        self.buffer[KECCAK256_RATE - 1] ^= 0x80;
        self.absorb_buffer();

        let mut output = [0u8; DIGEST_LEN];
        for (chunk, lane) in output.chunks_exact_mut(8).zip(self.state.iter()) {
            chunk.copy_from_slice(&lane.to_le_bytes());
        }
        output
    }

    /// Discard everything absorbed so far
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn absorb_buffer(&mut self) {
        for (lane, chunk) in self.state.iter_mut().zip(self.buffer.chunks_exact(8)) {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            *lane ^= u64::from_le_bytes(word);
        }
        keccak_f1600(&mut self.state);
        self.buffered = 0;
    }
}

/// Compute keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize()
}

/// Keccak-256 as lowercase hex, no prefix
pub fn keccak256_hex(data: &[u8]) -> String {
    hex::encode(keccak256(data))
}
