//! The interface this crate consumes from its caller.
//!
//! Everything about actually parsing a Mach-O file — load commands,
//! segment commands, DYLD chained-fixup chains — lives outside this
//! crate. `Image` and `ChainedFixups` are the entire surface the core
//! needs from whoever did that work; see `spec.md` §6 for the contract.

/// Byte order of the numeric fields in an [`Image`]'s buffer.
///
/// All known Swift/Mach-O binaries are little-endian, but the Byte Reader
/// honours whatever the `Image` reports rather than assuming it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// A single loaded segment: a virtual-address range mapped to a file-offset
/// base, used to translate `vmAddr -> fileOffset` for pointer slots that are
/// still expressed as virtual addresses (e.g. chained-fixup rebase targets).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Segment {
    pub vm_addr: u64,
    pub vm_size: u64,
    pub file_offset: u64,
}

impl Segment {
    /// Translates a virtual address into this segment's file offset, or
    /// `None` if the address falls outside the segment's range.
    pub fn file_offset_for(&self, vm_addr: u64) -> Option<u64> {
        if vm_addr < self.vm_addr {
            return None;
        }
        let delta = vm_addr - self.vm_addr;
        if delta >= self.vm_size {
            return None;
        }
        Some(self.file_offset + delta)
    }
}

/// Outcome of resolving a raw pointer-sized slot through DYLD chained
/// fixups, as reported by a caller's [`ChainedFixups`] implementation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FixupResolution {
    /// The slot binds to an external symbol by ordinal.
    Bind { ordinal: u32, addend: i64 },
    /// The slot rebases to an address within the same image.
    Rebase { vm_address: u64 },
    /// The raw value is not an encoded chained-fixup pointer at all.
    NotFixup,
}

/// Resolves DYLD chained-fixup pointer slots. Implemented entirely by the
/// caller; the core only consumes it from the Symbolic Resolver's
/// `indirectContext` (`0x02`) handler.
pub trait ChainedFixups {
    /// Decodes a raw little/big-endian pointer-sized word read from the
    /// image into a bind or rebase, or reports that it isn't a fixup.
    fn decode_pointer(&self, raw: u64) -> FixupResolution;

    /// Returns the textual symbol name bound to an ordinal, if known.
    fn symbol_name(&self, ordinal: u32) -> Option<&str>;
}

/// The read-only view of a Mach-O image this crate needs.
///
/// Implementations typically wrap a memory-mapped file plus the segment
/// list decoded from its load commands.
pub trait Image {
    /// The raw bytes of the image, addressed by file offset.
    fn bytes(&self) -> &[u8];

    /// Byte order of multi-byte integers within [`Image::bytes`].
    fn byte_order(&self) -> ByteOrder;

    /// Segments in file-offset order, used for `vmAddr -> fileOffset`
    /// translation.
    fn segments(&self) -> &[Segment];

    /// The chained-fixups resolver for this image, if DYLD chained fixups
    /// are present. `None` means indirect symbolic references fall back to
    /// reading the pointer slot directly (see `spec.md` §4.4).
    fn chained_fixups(&self) -> Option<&dyn ChainedFixups> {
        None
    }

    /// Locates a section by exact segment/section name pair, returning its
    /// `(file_offset, size)` if present.
    ///
    /// Per `spec.md` §6, the four Swift reflection sections are looked up
    /// first in `__TEXT`, then in `__DATA_CONST` as a fallback — callers of
    /// this method apply that fallback themselves (see
    /// [`crate::index::Inventory::from_image`]).
    fn find_section(&self, segment_name: &str, section_name: &str) -> Option<(u64, u64)>;
}

/// Translates a virtual address to a file offset by linear scan of an
/// image's segments, per `spec.md` §4.1's `addrToFileOffset`.
pub fn addr_to_file_offset(segments: &[Segment], vm_addr: u64) -> Option<u64> {
    segments.iter().find_map(|s| s.file_offset_for(vm_addr))
}
