//! Label alphabet for trie child dispatch.
//!
//! Every trie node branches through a fixed-size table indexed by a compact
//! character code rather than the raw byte value, so the table stays small
//! enough to embed per node. The code space covers the characters that occur
//! in DNS names on the wire: digits, both letter cases, and a handful of
//! separators seen in malformed or tunneled queries.

/// Number of dispatch slots in a node's child table.
pub const LABEL_SLOTS: usize = 68;

/// Shared slot for bytes outside the domain alphabet.
///
/// Distinct out-of-alphabet bytes collide here on dispatch; matching still
/// compares raw segment bytes, so collided children grow as chains below the
/// slot instead of being merged.
pub(crate) const OVERFLOW_SLOT: usize = 67;

/// Map a byte to its child-table slot.
pub(crate) fn slot_of(byte: u8) -> usize {
    match byte {
        b'0'..=b'9' => (byte - b'0') as usize,
        b'A'..=b'Z' => (byte - b'A') as usize + 10,
        b'a'..=b'z' => (byte - b'a') as usize + 36,
        b'-' => 62,
        b'>' => 63,
        b'_' => 64,
        b',' => 65,
        b' ' => 66,
        _ => {
            log::debug!("byte 0x{byte:02x} is outside the domain alphabet, using overflow slot");
            OVERFLOW_SLOT
        }
    }
}
