//! CRC-32 as used by PNG chunks (reflected IEEE 802.3 polynomial).

use std::sync::OnceLock;

// Table-reduction constant for the reflected polynomial.
const POLYNOMIAL: u32 = 0xEDB8_8320;

static TABLE: OnceLock<[u32; 256]> = OnceLock::new();

fn table() -> &'static [u32; 256] {
    TABLE.get_or_init(|| {
        let mut table = [0u32; 256];
        for (n, slot) in table.iter_mut().enumerate() {
            let mut c = n as u32;
            for _ in 0..8 {
                c = if c & 1 != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
            }
            *slot = c;
        }
        table
    })
}

/// CRC-32 of a byte slice.
///
/// Initial register `0xFFFFFFFF`, output complemented — the exact variant
/// PNG stores per chunk. The lookup table is built once and shared
/// read-only across threads.
pub fn crc32(bytes: &[u8]) -> u32 {
    let table = table();
    let mut state = 0xFFFF_FFFFu32;
    for &byte in bytes {
        state = table[((state ^ byte as u32) & 0xFF) as usize] ^ (state >> 8);
    }
    state ^ 0xFFFF_FFFF
}
