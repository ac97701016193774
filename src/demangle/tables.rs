//! Shortcut Tables (`spec.md` §4.2): constant maps used throughout the
//! demangler. Pure lookups, no state — matching the teacher's own
//! `type_attributes`/`assembly_flags` modules, which express closed static
//! mappings as plain `const`s and `match` arms rather than reaching for
//! `lazy_static`/`phf`.

/// Single-character type shortcuts. `S` is deliberately excluded: it is
/// never matched alone, only as the first byte of a two-character pattern
/// (`spec.md` §4.2).
pub fn single_char_type_shortcut(c: char) -> Option<&'static str> {
    Some(match c {
        'a' => "Array",
        'b' => "Bool",
        'D' => "Dictionary",
        'd' => "Double",
        'f' => "Float",
        'h' => "Set",
        'i' => "Int",
        's' => "Substring",
        'u' => "UInt",
        'q' => "Optional",
        _ => return None,
    })
}

/// Every `S*` two-character pattern, plus the concurrency `Sc*` family.
pub fn two_char_type_shortcut(s: &str) -> Option<&'static str> {
    Some(match s {
        "SS" => "String",
        "Si" => "Int",
        "Sb" => "Bool",
        "SD" => "Dictionary",
        "Sa" => "Array",
        "Sd" => "Double",
        "Sf" => "Float",
        "Sh" => "Set",
        "Su" => "UInt",
        "Sq" => "Optional",
        "yt" => "Void",
        "ScT" => "Task",
        "ScS" => "AsyncStream",
        "ScA" => "Actor",
        "ScM" => "MainActor",
        _ => return None,
    })
}

/// `Sg` is not a type name in its own right — it's always a trailing
/// optional-wrapping suffix, handled separately by the recursive parser.
pub const OPTIONAL_SUFFIX: &str = "Sg";

/// Protocol shortcuts, both the bare two-character form and the `s...P`
/// qualified form used inside existential/generic-constraint grammar.
pub fn protocol_shortcut(s: &str) -> Option<&'static str> {
    Some(match s {
        "SH" => "Hashable",
        "SE" => "Equatable",
        "Sl" => "Collection",
        "ST" => "Sequence",
        "SL" => "Comparable",
        "SY" => "RawRepresentable",
        "Se" => "Encodable",
        "SD" => "Decodable",
        "s5ErrorP" => "Error",
        "s8SendableP" => "Sendable",
        "s8HashableP" => "Hashable",
        _ => return None,
    })
}

/// ObjC-to-Swift bridged type names, keyed by the ObjC class/struct name.
pub fn objc_bridge(name: &str) -> Option<&'static str> {
    Some(match name {
        "NSString" => "String",
        "NSArray" => "Array",
        "NSDictionary" => "Dictionary",
        "NSSet" => "Set",
        "NSURL" => "URL",
        "NSData" => "Data",
        "NSDate" => "Date",
        "OS_dispatch_queue" => "DispatchQueue",
        _ => return None,
    })
}

/// `B`-prefixed builtin type shortcuts.
pub fn builtin_shortcut(s: &str) -> Option<&'static str> {
    Some(match s {
        "Bo" => "Builtin.NativeObject",
        "Bp" => "Builtin.RawPointer",
        "Bi" => "Builtin.Int",
        "Bf" => "Builtin.FPIEEE",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_CHAR: &[(char, &str)] = &[
        ('a', "Array"),
        ('b', "Bool"),
        ('D', "Dictionary"),
        ('d', "Double"),
        ('f', "Float"),
        ('h', "Set"),
        ('i', "Int"),
        ('s', "Substring"),
        ('u', "UInt"),
        ('q', "Optional"),
    ];

    #[test]
    fn every_single_char_mapping_round_trips() {
        for &(c, expected) in SINGLE_CHAR {
            assert_eq!(single_char_type_shortcut(c), Some(expected));
        }
    }

    #[test]
    fn bare_s_is_never_matched() {
        assert_eq!(single_char_type_shortcut('S'), None);
    }

    const TWO_CHAR: &[(&str, &str)] = &[
        ("SS", "String"),
        ("Si", "Int"),
        ("Sb", "Bool"),
        ("SD", "Dictionary"),
        ("Sa", "Array"),
        ("Sd", "Double"),
        ("Sf", "Float"),
        ("Sh", "Set"),
        ("Su", "UInt"),
        ("Sq", "Optional"),
        ("yt", "Void"),
        ("ScT", "Task"),
        ("ScS", "AsyncStream"),
        ("ScA", "Actor"),
        ("ScM", "MainActor"),
    ];

    #[test]
    fn every_two_char_mapping_round_trips() {
        for &(pattern, expected) in TWO_CHAR {
            assert_eq!(two_char_type_shortcut(pattern), Some(expected));
        }
    }

    const PROTOCOLS: &[(&str, &str)] = &[
        ("SH", "Hashable"),
        ("SE", "Equatable"),
        ("Sl", "Collection"),
        ("ST", "Sequence"),
        ("SL", "Comparable"),
        ("SY", "RawRepresentable"),
        ("Se", "Encodable"),
        ("SD", "Decodable"),
        ("s5ErrorP", "Error"),
        ("s8SendableP", "Sendable"),
        ("s8HashableP", "Hashable"),
    ];

    #[test]
    fn every_protocol_mapping_round_trips() {
        for &(pattern, expected) in PROTOCOLS {
            assert_eq!(protocol_shortcut(pattern), Some(expected));
        }
    }

    const OBJC: &[(&str, &str)] = &[
        ("NSString", "String"),
        ("NSArray", "Array"),
        ("NSDictionary", "Dictionary"),
        ("NSSet", "Set"),
        ("NSURL", "URL"),
        ("NSData", "Data"),
        ("NSDate", "Date"),
        ("OS_dispatch_queue", "DispatchQueue"),
    ];

    #[test]
    fn every_objc_bridge_round_trips() {
        for &(pattern, expected) in OBJC {
            assert_eq!(objc_bridge(pattern), Some(expected));
        }
    }

    const BUILTINS: &[(&str, &str)] = &[
        ("Bo", "Builtin.NativeObject"),
        ("Bp", "Builtin.RawPointer"),
        ("Bi", "Builtin.Int"),
        ("Bf", "Builtin.FPIEEE"),
    ];

    #[test]
    fn every_builtin_mapping_round_trips() {
        for &(pattern, expected) in BUILTINS {
            assert_eq!(builtin_shortcut(pattern), Some(expected));
        }
    }

    #[test]
    fn unknown_inputs_are_absent() {
        assert_eq!(two_char_type_shortcut("zz"), None);
        assert_eq!(protocol_shortcut("zz"), None);
        assert_eq!(objc_bridge("NSFoo"), None);
        assert_eq!(builtin_shortcut("Bz"), None);
    }
}
