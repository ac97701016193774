//! The data model (`spec.md` §3): immutable value records produced by one
//! pass over an image. Nothing here mutates after construction; the
//! [`crate::Inventory`] owns every record and its lookup indices only
//! borrow by name/address.

use bitvec::array::BitArray;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tagged context-descriptor kind, encoded in the low 5 bits of a context
/// descriptor's flags word. Values `16..=31` are "type kinds".
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DescriptorKind {
    Module,
    Extension,
    Anonymous,
    Protocol,
    OpaqueType,
    Class,
    Struct,
    Enum,
}

impl DescriptorKind {
    /// Decodes the low 5 bits of a context descriptor's flags word.
    pub fn from_low5(flags: u32) -> Option<Self> {
        match flags & 0x1f {
            0 => Some(DescriptorKind::Module),
            1 => Some(DescriptorKind::Extension),
            2 => Some(DescriptorKind::Anonymous),
            3 => Some(DescriptorKind::Protocol),
            4 => Some(DescriptorKind::OpaqueType),
            16 => Some(DescriptorKind::Class),
            17 => Some(DescriptorKind::Struct),
            18 => Some(DescriptorKind::Enum),
            _ => None,
        }
    }

    pub fn wire_value(self) -> u32 {
        match self {
            DescriptorKind::Module => 0,
            DescriptorKind::Extension => 1,
            DescriptorKind::Anonymous => 2,
            DescriptorKind::Protocol => 3,
            DescriptorKind::OpaqueType => 4,
            DescriptorKind::Class => 16,
            DescriptorKind::Struct => 17,
            DescriptorKind::Enum => 18,
        }
    }

    /// Whether this kind describes a nominal type (as opposed to a module,
    /// extension, anonymous context, protocol, or opaque type).
    pub fn is_type_kind(self) -> bool {
        matches!(self, DescriptorKind::Class | DescriptorKind::Struct | DescriptorKind::Enum)
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DescriptorKind::Module => "module",
            DescriptorKind::Extension => "extension",
            DescriptorKind::Anonymous => "anonymous",
            DescriptorKind::Protocol => "protocol",
            DescriptorKind::OpaqueType => "opaqueType",
            DescriptorKind::Class => "class",
            DescriptorKind::Struct => "struct",
            DescriptorKind::Enum => "enum",
        };
        f.write_str(name)
    }
}

/// A type context descriptor's flags word, decoded lazily via bit indexing
/// (`spec.md` §3/§4.5). Bit positions below follow the Swift ABI's
/// `ContextDescriptorFlags`/`TypeContextDescriptorFlags` layout: kind in
/// bits 0-4, `isGeneric` at bit 5, and `hasResilientSuperclass` at bit 10
/// (bit 2 of the class-specific kind flags that start at bit 8). `spec.md`
/// names these two bits without pinning their exact index; this is the
/// Open Question decision recorded in `DESIGN.md`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeContextDescriptorFlags(pub u32);

impl TypeContextDescriptorFlags {
    const IS_GENERIC_BIT: usize = 5;
    const HAS_RESILIENT_SUPERCLASS_BIT: usize = 10;

    fn bits(self) -> BitArray<[u32; 1]> {
        BitArray::new([self.0])
    }

    pub fn kind(self) -> Option<DescriptorKind> {
        DescriptorKind::from_low5(self.0)
    }

    pub fn is_generic(self) -> bool {
        self.bits().get(Self::IS_GENERIC_BIT).as_deref().copied().unwrap_or(false)
    }

    pub fn has_resilient_superclass(self) -> bool {
        self.bits()
            .get(Self::HAS_RESILIENT_SUPERCLASS_BIT)
            .as_deref()
            .copied()
            .unwrap_or(false)
    }
}

/// One discovered nominal type (`spec.md` §3).
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwiftType {
    pub address: u64,
    pub kind: DescriptorKind,
    pub name: String,
    pub parent_name: Option<String>,
    pub parent_kind: Option<DescriptorKind>,
    pub superclass_name: Option<String>,
    pub generic_parameters: Vec<String>,
    pub generic_param_count: u16,
    pub generic_requirements: Vec<SwiftGenericRequirement>,
    pub flags: u32,
}

impl SwiftType {
    /// `parentName + "." + name` when the parent is non-empty and not
    /// `Swift`; bare `name` otherwise (`spec.md` §3 invariant ii).
    pub fn full_name(&self) -> String {
        full_name(self.parent_name.as_deref(), &self.name)
    }
}

/// An extension of a (possibly foreign) type (`spec.md` §3).
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwiftExtension {
    pub address: u64,
    pub extended_type_name: String,
    pub mangled_extended_type_name: String,
    pub module_name: Option<String>,
    pub generic_parameters: Vec<String>,
    pub generic_param_count: u16,
    pub generic_requirements: Vec<SwiftGenericRequirement>,
    pub flags: u32,
}

impl SwiftExtension {
    /// `isGeneric <=> genericParamCount > 0` (`spec.md` §3).
    pub fn is_generic(&self) -> bool {
        self.generic_param_count > 0
    }
}

/// Decoded from the low 3 bits of a [`ConformanceFlags`] word.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConformanceTypeReferenceKind {
    DirectTypeDescriptor,
    IndirectTypeDescriptor,
    DirectObjCClass,
    IndirectObjCClass,
}

impl ConformanceTypeReferenceKind {
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits & 0x7 {
            0 => Some(ConformanceTypeReferenceKind::DirectTypeDescriptor),
            1 => Some(ConformanceTypeReferenceKind::IndirectTypeDescriptor),
            2 => Some(ConformanceTypeReferenceKind::DirectObjCClass),
            3 => Some(ConformanceTypeReferenceKind::IndirectObjCClass),
            _ => None,
        }
    }
}

/// A conformance record's flags word (`spec.md` §3).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConformanceFlags(pub u32);

impl ConformanceFlags {
    fn bits(self) -> BitArray<[u32; 1]> {
        BitArray::new([self.0])
    }

    pub fn type_reference_kind(self) -> Option<ConformanceTypeReferenceKind> {
        ConformanceTypeReferenceKind::from_bits(self.0)
    }

    pub fn is_retroactive(self) -> bool {
        self.bits().get(3).as_deref().copied().unwrap_or(false)
    }

    pub fn is_synthesized_non_unique(self) -> bool {
        self.bits().get(4).as_deref().copied().unwrap_or(false)
    }

    pub fn has_resilient_witnesses(self) -> bool {
        self.bits().get(5).as_deref().copied().unwrap_or(false)
    }

    pub fn has_generic_witness_table(self) -> bool {
        self.bits().get(6).as_deref().copied().unwrap_or(false)
    }

    pub fn num_conditional_requirements(self) -> u16 {
        ((self.0 >> 8) & 0xff) as u16
    }

    pub fn is_conditional(self) -> bool {
        self.num_conditional_requirements() > 0
    }
}

/// A protocol conformance record (`spec.md` §3).
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwiftConformance {
    pub address: u64,
    pub type_ref_address: Option<u64>,
    pub type_name: String,
    pub mangled_type_name: String,
    pub protocol_name: String,
    pub protocol_address: Option<u64>,
    pub flags: ConformanceFlags,
}

impl SwiftConformance {
    pub fn is_retroactive(&self) -> bool {
        self.flags.is_retroactive()
    }

    pub fn is_conditional(&self) -> bool {
        self.flags.is_conditional()
    }
}

/// The kind of a field descriptor (`spec.md` §3): what sort of type owns
/// the field records that follow.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FieldDescriptorKind {
    Struct,
    Class,
    Enum,
    MultiPayloadEnum,
    Protocol,
    ClassProtocol,
    ObjCProtocol,
    ObjCClass,
}

impl FieldDescriptorKind {
    pub fn from_wire(value: u16) -> Option<Self> {
        match value {
            0 => Some(FieldDescriptorKind::Struct),
            1 => Some(FieldDescriptorKind::Class),
            2 => Some(FieldDescriptorKind::Enum),
            3 => Some(FieldDescriptorKind::MultiPayloadEnum),
            4 => Some(FieldDescriptorKind::Protocol),
            5 => Some(FieldDescriptorKind::ClassProtocol),
            6 => Some(FieldDescriptorKind::ObjCProtocol),
            7 => Some(FieldDescriptorKind::ObjCClass),
            _ => None,
        }
    }
}

/// A single mangled-name byte window: the decoded string, the raw bytes
/// exactly as they appear in the image, and the file offset those bytes
/// start at. All three are required together because symbolic references
/// embedded in the bytes only resolve correctly against their original
/// offset (`spec.md` §3 invariant v).
#[derive(Debug, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MangledNameWindow {
    pub string: String,
    pub raw_bytes: Vec<u8>,
    pub file_offset: u64,
}

impl MangledNameWindow {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.string.is_empty() && self.raw_bytes.is_empty() && self.file_offset == 0
    }

    /// Whether the raw byte window contains an embedded symbolic-reference
    /// marker (`0x01`/`0x02`/`0x09`..`0x17`) anywhere within it.
    pub fn has_symbolic_reference(&self) -> bool {
        self.raw_bytes.iter().any(|&b| (0x01..=0x17).contains(&b))
    }
}

/// One field of a struct/class/enum, as described by a field descriptor
/// (`spec.md` §3).
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwiftFieldRecord {
    pub flags: u32,
    pub name: String,
    pub mangled_type: MangledNameWindow,
}

impl SwiftFieldRecord {
    pub fn is_indirect_enum_case(&self) -> bool {
        self.flags & 0x1 != 0
    }

    pub fn is_var(&self) -> bool {
        self.flags & 0x2 != 0
    }
}

/// A field descriptor: the owning type plus its ordered field records
/// (`spec.md` §3).
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwiftFieldDescriptor {
    pub address: u64,
    pub kind: FieldDescriptorKind,
    pub mangled_type_name: MangledNameWindow,
    pub superclass_mangled_name: Option<MangledNameWindow>,
    pub fields: Vec<SwiftFieldRecord>,
}

/// Kind of a generic requirement (`spec.md` §3).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GenericRequirementKind {
    Protocol,
    SameType,
    BaseClass,
    SameConformance,
    Layout,
}

impl GenericRequirementKind {
    pub fn from_wire(value: u32) -> Option<Self> {
        match value & 0xf {
            0 => Some(GenericRequirementKind::Protocol),
            1 => Some(GenericRequirementKind::SameType),
            2 => Some(GenericRequirementKind::BaseClass),
            3 => Some(GenericRequirementKind::SameConformance),
            4 => Some(GenericRequirementKind::Layout),
            _ => None,
        }
    }
}

/// A single `where`-clause requirement attached to a generic type/extension
/// (`spec.md` §3).
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwiftGenericRequirement {
    pub kind: GenericRequirementKind,
    pub subject: String,
    pub constraint: String,
    pub flags: u32,
}

impl SwiftGenericRequirement {
    pub fn has_key_argument(&self) -> bool {
        self.flags & 0x80 != 0
    }

    pub fn has_extra_argument(&self) -> bool {
        self.flags & 0x40 != 0
    }

    pub fn param_index(&self) -> u8 {
        ((self.flags >> 16) & 0xff) as u8
    }
}

/// `spec.md` §3 invariant ii, shared by [`SwiftType::full_name`] and the
/// parent-name joining the Descriptor Walker performs for extensions.
pub fn full_name(parent_name: Option<&str>, name: &str) -> String {
    match parent_name {
        Some(parent) if !parent.is_empty() && parent != "Swift" => format!("{parent}.{name}"),
        _ => name.to_string(),
    }
}

/// Synthesizes generic parameter names the way `spec.md` §4.5 specifies:
/// 1 -> `[T]`; 2..=4 -> a prefix of `[T, U, V, W]`; otherwise `T0..Tn-1`.
pub fn synthesize_generic_param_names(count: u16) -> Vec<String> {
    const NAMED: [&str; 4] = ["T", "U", "V", "W"];
    match count {
        0 => Vec::new(),
        1..=4 => NAMED[..count as usize].iter().map(|s| s.to_string()).collect(),
        n => (0..n).map(|i| format!("T{i}")).collect(),
    }
}

/// Clamps a raw generic-parameter count to `[1, 16]`, per `spec.md` §4.5 —
/// values outside that range mean "treat as no generics" (i.e. `0`).
pub fn clamp_generic_param_count(raw: u16) -> u16 {
    if (1..=16).contains(&raw) {
        raw
    } else {
        0
    }
}

/// Clamps a raw generic-requirement count to `[0, 32]`, per `spec.md` §4.5.
pub fn clamp_generic_requirement_count(raw: u16) -> u16 {
    if raw <= 32 {
        raw
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_kind_round_trips_wire_values() {
        for kind in [
            DescriptorKind::Module,
            DescriptorKind::Extension,
            DescriptorKind::Anonymous,
            DescriptorKind::Protocol,
            DescriptorKind::OpaqueType,
            DescriptorKind::Class,
            DescriptorKind::Struct,
            DescriptorKind::Enum,
        ] {
            assert_eq!(DescriptorKind::from_low5(kind.wire_value()), Some(kind));
        }
    }

    #[test]
    fn type_kinds_are_16_to_31() {
        assert!(!DescriptorKind::Module.is_type_kind());
        assert!(!DescriptorKind::Protocol.is_type_kind());
        assert!(DescriptorKind::Class.is_type_kind());
        assert!(DescriptorKind::Struct.is_type_kind());
        assert!(DescriptorKind::Enum.is_type_kind());
    }

    #[test]
    fn full_name_joins_non_empty_non_swift_parent() {
        assert_eq!(full_name(Some("Bar"), "Foo"), "Bar.Foo");
        assert_eq!(full_name(Some("Swift"), "Foo"), "Foo");
        assert_eq!(full_name(Some(""), "Foo"), "Foo");
        assert_eq!(full_name(None, "Foo"), "Foo");
    }

    #[test]
    fn generic_param_names_follow_spec_table() {
        assert_eq!(synthesize_generic_param_names(1), vec!["T"]);
        assert_eq!(synthesize_generic_param_names(2), vec!["T", "U"]);
        assert_eq!(synthesize_generic_param_names(4), vec!["T", "U", "V", "W"]);
        assert_eq!(synthesize_generic_param_names(5), vec!["T0", "T1", "T2", "T3", "T4"]);
    }

    #[test]
    fn generic_param_count_clamp() {
        assert_eq!(clamp_generic_param_count(0), 0);
        assert_eq!(clamp_generic_param_count(1), 1);
        assert_eq!(clamp_generic_param_count(16), 16);
        assert_eq!(clamp_generic_param_count(17), 0);
    }

    #[test]
    fn conformance_flags_decode_bits() {
        // kind=IndirectObjCClass(3), retroactive, 5 conditional requirements.
        let raw = 0b0000_0101_0000_1011u32;
        let flags = ConformanceFlags(raw);
        assert_eq!(flags.type_reference_kind(), Some(ConformanceTypeReferenceKind::IndirectObjCClass));
        assert!(flags.is_retroactive());
        assert_eq!(flags.num_conditional_requirements(), 5);
        assert!(flags.is_conditional());
    }

    #[test]
    fn type_context_descriptor_flags_decode_generic_and_resilient_bits() {
        let flags = TypeContextDescriptorFlags(DescriptorKind::Class.wire_value() | (1 << 5) | (1 << 10));
        assert_eq!(flags.kind(), Some(DescriptorKind::Class));
        assert!(flags.is_generic());
        assert!(flags.has_resilient_superclass());
    }

    #[test]
    fn field_record_flag_bits() {
        let indirect = SwiftFieldRecord { flags: 0x1, name: "x".into(), mangled_type: MangledNameWindow::empty() };
        let var_field = SwiftFieldRecord { flags: 0x2, name: "y".into(), mangled_type: MangledNameWindow::empty() };
        assert!(indirect.is_indirect_enum_case());
        assert!(!indirect.is_var());
        assert!(var_field.is_var());
    }

    #[test]
    fn mangled_name_window_detects_symbolic_bytes() {
        let w = MangledNameWindow { string: String::new(), raw_bytes: vec![0x53, 0x01, 0, 0, 0, 0], file_offset: 0 };
        assert!(w.has_symbolic_reference());
        let none = MangledNameWindow { string: "Si".into(), raw_bytes: b"Si".to_vec(), file_offset: 4 };
        assert!(!none.has_symbolic_reference());
    }
}
