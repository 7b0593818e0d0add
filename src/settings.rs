/// Smallest number drawn for a passphrase.
pub const MIN_NUM: i64 = 100_000;
/// Largest number drawn for a passphrase.
pub const MAX_NUM: i64 = 999_999;

/// Entropy target used when none is given; below it results are flagged as insecure.
pub const ENTROPY_BITS_MIN: f64 = 77.0;

/// Below this many bits in the kernel pool generation is refused unless forced.
pub const SYSTEM_ENTROPY_BITS_MIN: u32 = 128;

/// Random bits in a generated UUIDv4: 120 from the hex groups plus 2 from the variant nibble.
pub const UUID4_ENTROPY_BITS: f64 = 122.0;

pub const DEFAULT_SEPARATOR: &str = " ";
