//! Extension context descriptor parsing (`spec.md` §4.5 "Extension
//! descriptor").

use super::context::{read_generics, GenericInfo};
use crate::model::{DescriptorKind, SwiftExtension, TypeContextDescriptorFlags};
use crate::reader::ByteReader;
use crate::ReflectionLimits;

/// Parses an extension context descriptor whose header starts at file
/// offset `target`. Returns `None` if the descriptor isn't an extension
/// kind or its extended-type name is empty.
pub(crate) fn parse_extension_descriptor(
    reader: &ByteReader,
    target: i64,
    limits: &ReflectionLimits,
) -> Option<SwiftExtension> {
    let flags = reader.u32(target);
    if DescriptorKind::from_low5(flags) != Some(DescriptorKind::Extension) {
        return None;
    }
    let tcd_flags = TypeContextDescriptorFlags(flags);

    let mangled = reader.rel_string(target + 8)?;
    if mangled.is_empty() {
        return None;
    }
    let mangled_owned = mangled.to_string();

    let demangled = crate::demangle::demangle(mangled);
    let extended_type_name = if demangled == mangled {
        clean_fallback(mangled)
    } else {
        demangled
    };

    let module_name = reader.rel_ptr(target + 4).and_then(|parent| reader.rel_string(parent + 8)).map(str::to_string);

    let generics = if tcd_flags.is_generic() {
        read_generics(reader, target + 12, limits)
    } else {
        GenericInfo::default()
    };

    Some(SwiftExtension {
        address: target as u64,
        extended_type_name,
        mangled_extended_type_name: mangled_owned,
        module_name,
        generic_parameters: generics.parameters,
        generic_param_count: generics.param_count,
        generic_requirements: generics.requirements,
        flags,
    })
}

/// When demangling doesn't change the input (it isn't recognised), strip a
/// leading `$s` or `_Tt` as a last-resort cleanup (`spec.md` §4.5).
fn clean_fallback(mangled: &str) -> String {
    mangled.strip_prefix("$s").or_else(|| mangled.strip_prefix("_Tt")).unwrap_or(mangled).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ByteOrder;

    fn rel_i32(value: i32) -> [u8; 4] {
        value.to_le_bytes()
    }

    #[test]
    fn extension_reads_module_and_demangles_extended_type() {
        let mut bytes = vec![0u8; 256];
        bytes[0..4].copy_from_slice(&1u32.to_le_bytes()); // extension kind
        bytes[4..8].copy_from_slice(&rel_i32(36)); // parent target = 4+36=40
        bytes[8..12].copy_from_slice(&rel_i32(52)); // extendedContext target = 8+52=60
        bytes[60..85].copy_from_slice(b"_TtC10Foundation8NSObject");
        bytes[85] = 0;

        bytes[48..52].copy_from_slice(&rel_i32(52)); // module name target = 48+52=100
        bytes[100..104].copy_from_slice(b"Bar\0");

        let reader = ByteReader::new(&bytes, &[], ByteOrder::Little);
        let ext = parse_extension_descriptor(&reader, 0, &ReflectionLimits::default()).unwrap();
        assert_eq!(ext.extended_type_name, "Foundation.NSObject");
        assert_eq!(ext.module_name.as_deref(), Some("Bar"));
        assert!(!ext.is_generic());
    }

    #[test]
    fn empty_extended_name_is_discarded() {
        let mut bytes = vec![0u8; 32];
        bytes[0..4].copy_from_slice(&1u32.to_le_bytes());
        bytes[8..12].copy_from_slice(&rel_i32(20)); // target=28, which is a NUL byte -> empty string
        let reader = ByteReader::new(&bytes, &[], ByteOrder::Little);
        assert!(parse_extension_descriptor(&reader, 0, &ReflectionLimits::default()).is_none());
    }

    #[test]
    fn non_extension_kind_is_rejected() {
        let mut bytes = vec![0u8; 32];
        bytes[0..4].copy_from_slice(&16u32.to_le_bytes()); // class
        let reader = ByteReader::new(&bytes, &[], ByteOrder::Little);
        assert!(parse_extension_descriptor(&reader, 0, &ReflectionLimits::default()).is_none());
    }
}
