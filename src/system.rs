#[cfg(target_os = "linux")]
const ENTROPY_AVAIL: &str = "/proc/sys/kernel/random/entropy_avail";

/// Bits currently available in the kernel entropy pool, when the platform exposes it.
#[cfg(target_os = "linux")]
pub fn system_entropy() -> Option<u32> {
    std::fs::read_to_string(ENTROPY_AVAIL)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

#[cfg(not(target_os = "linux"))]
pub fn system_entropy() -> Option<u32> {
    None
}
