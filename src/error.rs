/// Errors raised at the crate's library boundary.
///
/// The core decoder itself never raises this while walking a section: a
/// malformed descriptor is skipped (see [`crate::descriptors`]) and an
/// unresolvable name becomes a placeholder string (see
/// [`crate::demangle::symbolic`]). `ReflectError` exists only for the
/// handful of genuinely programmer-facing misuses of the public API.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReflectError {
    /// The requested section was not present in `__TEXT` nor
    /// `__DATA_CONST`.
    MissingSection(&'static str),
    /// A segment list could not translate a virtual address because no
    /// segment claims it.
    UnmappedAddress(u64),
    /// An address was looked up in an [`crate::Inventory`] index that has
    /// no record at that offset.
    UnknownAddress(u64),
}

impl std::fmt::Display for ReflectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReflectError::MissingSection(name) => write!(f, "missing section: {name}"),
            ReflectError::UnmappedAddress(addr) => {
                write!(f, "virtual address 0x{addr:x} is not covered by any segment")
            }
            ReflectError::UnknownAddress(addr) => {
                write!(f, "no record at file offset 0x{addr:x}")
            }
        }
    }
}

impl std::error::Error for ReflectError {}
