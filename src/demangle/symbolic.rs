//! The Symbolic Resolver (`spec.md` §4.4): resolves 5-byte in-binary
//! symbolic-reference tokens and the mixed textual/binary mangled-name
//! windows that embed them.
//!
//! Grounded on the teacher's heap/index resolvers (`raw::metadata::heaps`):
//! same "follow an offset into the image, with a per-instance memoisation
//! cache" shape. Unlike the teacher's resolvers, this one is explicitly
//! *not* `Send`/`Sync` — the caches are `RefCell`s, not locks — per
//! `spec.md` §4.4's "callers must instantiate one per thread".

use std::cell::RefCell;
use std::collections::HashMap;

use super::{tables, text};
use crate::image::{ChainedFixups, FixupResolution};
use crate::reader::ByteReader;

const MARKER_RANGE: std::ops::RangeInclusive<u8> = 0x01..=0x17;
const DIRECT_CONTEXT: u8 = 0x01;
const INDIRECT_CONTEXT: u8 = 0x02;
const DIRECT_OBJC_PROTOCOL: u8 = 0x09;

/// Resolves symbolic references against one image, memoising lookups by
/// target file offset. Each instance owns its own caches, so a single
/// resolver must not be shared across threads.
pub struct SymbolicResolver<'a> {
    reader: ByteReader<'a>,
    chained_fixups: Option<&'a dyn ChainedFixups>,
    type_name_cache: RefCell<HashMap<i64, String>>,
    module_name_cache: RefCell<HashMap<i64, String>>,
}

impl<'a> SymbolicResolver<'a> {
    pub fn new(reader: ByteReader<'a>, chained_fixups: Option<&'a dyn ChainedFixups>) -> Self {
        Self {
            reader,
            chained_fixups,
            type_name_cache: RefCell::new(HashMap::new()),
            module_name_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolves one 5-byte symbolic-reference token whose marker byte sits
    /// at the absolute file offset `source_offset`.
    pub fn resolve_token(&self, source_offset: i64) -> String {
        let marker = match self.byte_at(source_offset) {
            Some(m) if MARKER_RANGE.contains(&m) => m,
            _ => return "/* invalid offset */".to_string(),
        };
        let field_offset = source_offset + 1;
        let target = match self.reader.rel_ptr(field_offset) {
            Some(t) => t,
            None => return "/* invalid offset */".to_string(),
        };
        match marker {
            DIRECT_CONTEXT => self.resolve_direct_context(target),
            INDIRECT_CONTEXT => self.resolve_indirect_context(target),
            DIRECT_OBJC_PROTOCOL => self.resolve_direct_objc_protocol(target),
            _ => "/* unknown ref */".to_string(),
        }
    }

    /// Resolves a mangled-name byte window that may be purely textual,
    /// a bare symbolic token (with an optional trailing generic suffix), or
    /// a mix of both (`spec.md` §4.4). `window_file_offset` is the absolute
    /// file offset of `window[0]`.
    pub fn resolve_window(&self, window: &[u8], window_file_offset: i64) -> String {
        if window.is_empty() {
            return String::new();
        }
        if MARKER_RANGE.contains(&window[0]) && window.len() >= 5 {
            let base = self.resolve_token(window_file_offset);
            return self.apply_generic_suffix(base, &window[5..]);
        }
        if window[1..].iter().any(|&b| b == DIRECT_CONTEXT || b == INDIRECT_CONTEXT) {
            return self
                .parse_mixed(window, window_file_offset, 0)
                .map(|(s, _)| s)
                .unwrap_or_else(|| tolerant_concatenation(window));
        }
        match std::str::from_utf8(window) {
            Ok(s) => text::demangle(s),
            Err(_) => tolerant_concatenation(window),
        }
    }

    fn byte_at(&self, offset: i64) -> Option<u8> {
        if offset < 0 {
            return None;
        }
        self.reader.buffer().get(offset as usize).copied()
    }

    fn resolve_direct_context(&self, target: i64) -> String {
        if let Some(cached) = self.type_name_cache.borrow().get(&target) {
            return cached.clone();
        }
        let name = match self.reader.rel_string(target + 8) {
            Some(n) => n,
            None => return "/* invalid offset */".to_string(),
        };
        let parent_name = self.reader.rel_ptr(target + 4).map(|p| self.resolve_parent_name(p));
        let result = crate::model::full_name(parent_name.as_deref(), name);
        self.type_name_cache.borrow_mut().insert(target, result.clone());
        result
    }

    /// Parent names are resolved one level deep (bare name, no further
    /// ancestor chain) and cached separately from leaf type names, since a
    /// parent context descriptor is overwhelmingly a module.
    fn resolve_parent_name(&self, target: i64) -> String {
        if let Some(cached) = self.module_name_cache.borrow().get(&target) {
            return cached.clone();
        }
        let result = match self.reader.rel_string(target + 8) {
            Some(n) => n.to_string(),
            None => "/* invalid offset */".to_string(),
        };
        self.module_name_cache.borrow_mut().insert(target, result.clone());
        result
    }

    fn resolve_indirect_context(&self, target: i64) -> String {
        if target < 0 {
            return "/* invalid offset */".to_string();
        }
        if let Some(fixups) = self.chained_fixups {
            let raw = self.reader.u64(target);
            match fixups.decode_pointer(raw) {
                FixupResolution::Bind { ordinal, .. } => {
                    return match fixups.symbol_name(ordinal) {
                        Some(sym) => text::demangle(sym.strip_prefix('_').unwrap_or(sym)),
                        None => "/* external type */".to_string(),
                    };
                }
                FixupResolution::Rebase { vm_address } => {
                    return match self.reader.addr_to_file_offset(vm_address) {
                        Some(file_offset) => self.resolve_direct_context(file_offset as i64),
                        None => "/* invalid offset */".to_string(),
                    };
                }
                FixupResolution::NotFixup => {}
            }
        }
        let raw = self.reader.u64(target);
        let raw = if raw == 0 { self.reader.u32(target) as u64 } else { raw };
        match self.reader.addr_to_file_offset(raw) {
            Some(file_offset) => self.resolve_direct_context(file_offset as i64),
            None => "/* invalid offset */".to_string(),
        }
    }

    fn resolve_direct_objc_protocol(&self, target: i64) -> String {
        if target < 0 {
            return "/* invalid offset */".to_string();
        }
        let via_cstring_pointer = {
            let ptr = self.reader.u64(target);
            self.reader.addr_to_file_offset(ptr).and_then(|off| self.reader.string_at(off as i64))
        };
        match via_cstring_pointer.or_else(|| self.reader.rel_string(target)) {
            Some(n) => n.to_string(),
            None => "/* invalid offset */".to_string(),
        }
    }

    /// Decodes a trailing generic application after a resolved symbolic
    /// token (`spec.md` §4.4's "generic suffix decoding").
    fn apply_generic_suffix(&self, parent: String, suffix: &[u8]) -> String {
        if suffix.is_empty() {
            return parent;
        }
        let Ok(text) = std::str::from_utf8(suffix) else {
            return parent;
        };
        let mut result = parent;
        if let Some(rest) = text.strip_prefix('y') {
            let body = rest.strip_suffix('G').unwrap_or(rest);
            result = format!("{result}<{}>", text::demangle(body));
        }
        if text.contains(tables::OPTIONAL_SUFFIX) {
            result.push('?');
        }
        result
    }

    /// The mixed-binary parser (`spec.md` §4.4): recursive descent,
    /// depth-capped, over a byte window that interleaves textual mangling
    /// grammar with embedded 5-byte symbolic tokens. Returns the rendered
    /// string plus the number of bytes consumed.
    fn parse_mixed(&self, window: &[u8], file_offset: i64, depth: usize) -> Option<(String, usize)> {
        if depth > text::MAX_RECURSION_DEPTH || window.is_empty() {
            return None;
        }

        if let Some(result) = self.parse_mixed_container(window, file_offset, depth) {
            return Some(result);
        }

        if MARKER_RANGE.contains(&window[0]) && window.len() >= 5 {
            let resolved = self.resolve_token(file_offset);
            let mut consumed = 5;
            let mut rendered = resolved;
            if window[consumed..].starts_with(tables::OPTIONAL_SUFFIX.as_bytes()) {
                consumed += 2;
                rendered.push('?');
            }
            return Some((rendered, consumed));
        }

        if window.len() >= 2 {
            if let Ok(two) = std::str::from_utf8(&window[..2]) {
                if let Some(name) = tables::two_char_type_shortcut(two) {
                    let mut consumed = 2;
                    let mut rendered = name.to_string();
                    if window[consumed..].starts_with(tables::OPTIONAL_SUFFIX.as_bytes()) {
                        consumed += 2;
                        rendered.push('?');
                    }
                    return Some((rendered, consumed));
                }
            }
        }
        if window[0] != b'S' {
            if let Some(name) = tables::single_char_type_shortcut(window[0] as char) {
                let mut consumed = 1;
                let mut rendered = name.to_string();
                if window[consumed..].starts_with(tables::OPTIONAL_SUFFIX.as_bytes()) {
                    consumed += 2;
                    rendered.push('?');
                }
                return Some((rendered, consumed));
            }
        }

        if window[0] == b'y' {
            return Some(("Void".to_string(), 1));
        }

        if window[0].is_ascii_digit() {
            let text = std::str::from_utf8(window).ok()?;
            let mut cursor = text::Cursor::new(text);
            let name = cursor.consume_identifier()?;
            let name = name.to_string();
            text::consume_type_suffix(&mut cursor);
            return Some((name, cursor.position()));
        }

        if window.starts_with(b"So") {
            let text = std::str::from_utf8(&window[2..]).ok()?;
            let mut cursor = text::Cursor::new(text);
            let name = cursor.consume_identifier()?;
            let existential = text::consume_type_suffix(&mut cursor);
            let mapped = tables::objc_bridge(name).map(str::to_string).unwrap_or_else(|| format!("__C.{name}"));
            let rendered = if existential { format!("any {mapped}") } else { mapped };
            return Some((rendered, 2 + cursor.position()));
        }

        None
    }

    fn parse_mixed_container(&self, window: &[u8], file_offset: i64, depth: usize) -> Option<(String, usize)> {
        let (prefix, is_dict) = if window.starts_with(b"Say") {
            (b"Say", false)
        } else if window.starts_with(b"SDy") {
            (b"SDy", true)
        } else if window.starts_with(b"Shy") {
            (b"Shy", false)
        } else {
            return None;
        };
        let mut pos = prefix.len();
        let (first, consumed) = self.parse_mixed(&window[pos..], file_offset + pos as i64, depth + 1)?;
        pos += consumed;
        let second = if is_dict {
            let (second, consumed) = self.parse_mixed(&window[pos..], file_offset + pos as i64, depth + 1)?;
            pos += consumed;
            Some(second)
        } else {
            None
        };
        if window.get(pos) != Some(&b'G') {
            return None;
        }
        pos += 1;
        let mut rendered = match prefix {
            b"Say" => format!("[{first}]"),
            b"SDy" => format!("[{first}: {}]", second.unwrap()),
            b"Shy" => format!("Set<{first}>"),
            _ => unreachable!(),
        };
        if window[pos..].starts_with(tables::OPTIONAL_SUFFIX.as_bytes()) {
            pos += 2;
            rendered.push('?');
        }
        Some((rendered, pos))
    }
}

fn tolerant_concatenation(window: &[u8]) -> String {
    window.iter().filter(|&&b| b.is_ascii_graphic() || b == b' ').map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ByteOrder, Segment};

    fn rel_i32(value: i32) -> [u8; 4] {
        value.to_le_bytes()
    }

    #[test]
    fn unknown_marker_yields_placeholder_bracketed_comment() {
        let mut bytes = vec![0u8; 16];
        bytes[0] = 0x05; // unknown-but-in-range marker
        bytes[1..5].copy_from_slice(&rel_i32(4));
        let reader = ByteReader::new(&bytes, &[], ByteOrder::Little);
        let resolver = SymbolicResolver::new(reader, None);
        let result = resolver.resolve_token(0);
        assert!(result.starts_with("/* "));
        assert!(result.ends_with(" */"));
    }

    #[test]
    fn direct_context_composes_parent_and_name_omitting_swift() {
        // Layout: [marker@0][i32 rel-ptr@1 -> target 10]
        // target(10): [flags u32][parent rel-ptr i32 -> 30][pad][name rel-ptr @ target+8 -> 60]
        let mut bytes = vec![0u8; 128];
        bytes[0] = 0x01;
        bytes[1..5].copy_from_slice(&rel_i32(9)); // target = 1 + 9 = 10
        bytes[10 + 4..10 + 8].copy_from_slice(&rel_i32(16)); // parent field at 14, target 30
        // parent descriptor at 30: name field at 30+8=38 -> "Bar\0" at some offset
        bytes[38..42].copy_from_slice(&rel_i32(22)); // target = 38 + 22 = 60
        bytes[60..64].copy_from_slice(b"Bar\0");
        // leaf name field at 10+8=18, target must point to "Foo\0"
        bytes[18..22].copy_from_slice(&rel_i32(50)); // target = 18 + 50 = 68
        bytes[68..72].copy_from_slice(b"Foo\0");

        let reader = ByteReader::new(&bytes, &[], ByteOrder::Little);
        let resolver = SymbolicResolver::new(reader, None);
        assert_eq!(resolver.resolve_token(0), "Bar.Foo");
    }

    #[test]
    fn indirect_context_without_chained_fixups_translates_vm_address() {
        let mut bytes = vec![0u8; 256];
        bytes[0] = 0x02;
        bytes[1..5].copy_from_slice(&rel_i32(9)); // target = 10
        // slot at file offset 10 holds a vm address 0x2000
        bytes[10..18].copy_from_slice(&0x2000u64.to_le_bytes());
        // context descriptor lives at file offset 100 (mapped from vm 0x2000)
        bytes[100 + 8..100 + 12].copy_from_slice(&rel_i32(20)); // name field at 108, target 128
        bytes[128..132].copy_from_slice(b"Baz\0");

        let segments = [Segment { vm_addr: 0x2000, vm_size: 0x100, file_offset: 100 }];
        let reader = ByteReader::new(&bytes, &segments, ByteOrder::Little);
        let resolver = SymbolicResolver::new(reader, None);
        assert_eq!(resolver.resolve_token(0), "Baz");
    }

    #[test]
    fn direct_objc_protocol_reads_cstring_pointer() {
        let mut bytes = vec![0u8; 256];
        bytes[0] = 0x09;
        bytes[1..5].copy_from_slice(&rel_i32(9)); // target = 10
        bytes[10..18].copy_from_slice(&0x3000u64.to_le_bytes());
        bytes[150..160].copy_from_slice(b"NSObject\0\0");

        let segments = [Segment { vm_addr: 0x3000, vm_size: 0x100, file_offset: 150 }];
        let reader = ByteReader::new(&bytes, &segments, ByteOrder::Little);
        let resolver = SymbolicResolver::new(reader, None);
        assert_eq!(resolver.resolve_token(0), "NSObject");
    }

    #[test]
    fn caching_returns_the_same_value_on_repeated_lookup() {
        let mut bytes = vec![0u8; 128];
        bytes[0] = 0x01;
        bytes[1..5].copy_from_slice(&rel_i32(9));
        bytes[10 + 8..10 + 12].copy_from_slice(&rel_i32(50));
        bytes[68..72].copy_from_slice(b"Foo\0");
        let reader = ByteReader::new(&bytes, &[], ByteOrder::Little);
        let resolver = SymbolicResolver::new(reader, None);
        let first = resolver.resolve_token(0);
        let second = resolver.resolve_token(0);
        assert_eq!(first, second);
        assert_eq!(resolver.type_name_cache.borrow().len(), 1);
    }

    #[test]
    fn mixed_array_of_symbolic_reference_resolves_element() {
        // window: "Say" + symbolic(0x01, rel offset to target) + "G"
        let mut image = vec![0u8; 128];
        // symbolic token sits at file offset 3 within the window (window starts at file offset 0)
        image[3] = 0x01;
        image[4..8].copy_from_slice(&rel_i32(42)); // target = 4 + 42 = 46
        image[46 + 8..46 + 12].copy_from_slice(&rel_i32(20)); // name field at 54, target 74
        image[74..78].copy_from_slice(b"Baz\0");
        image[0..3].copy_from_slice(b"Say");
        image[8] = b'G';

        let reader = ByteReader::new(&image, &[], ByteOrder::Little);
        let resolver = SymbolicResolver::new(reader, None);
        let window = &image[0..9];
        assert_eq!(resolver.resolve_window(window, 0), "[Baz]");
    }

    #[test]
    fn purely_textual_window_goes_through_the_text_demangler() {
        let bytes = b"SiSg".to_vec();
        let reader = ByteReader::new(&bytes, &[], ByteOrder::Little);
        let resolver = SymbolicResolver::new(reader, None);
        assert_eq!(resolver.resolve_window(&bytes, 0), "Int?");
    }
}
