//! Pure, read-only derivations over an [`Inventory`] (`spec.md` §2
//! "Analyzers (pure)"). `spec.md` names this component in its table but
//! gives it no dedicated `§4.x` subsection; the operations below are
//! supplemented from §8's testable properties and §9's Open Questions (see
//! `SPEC_FULL.md` §4.7 and `DESIGN.md`).
//!
//! Every function here is `&Inventory -> T`: no mutation, no I/O, no
//! allocation beyond the returned collection.

use crate::model::{DescriptorKind, SwiftConformance, SwiftExtension, SwiftType};
use crate::Inventory;

/// All types of a given [`DescriptorKind`] (class/struct/enum).
pub fn types_by_kind(inventory: &Inventory, kind: DescriptorKind) -> Vec<&SwiftType> {
    inventory.types().iter().filter(|t| t.kind == kind).collect()
}

/// Every type with at least one generic parameter.
pub fn generic_types(inventory: &Inventory) -> Vec<&SwiftType> {
    inventory.types().iter().filter(|t| t.generic_param_count > 0).collect()
}

/// Every conformance declared outside the module that defines the
/// conforming type (`spec.md` GLOSSARY "Retroactive conformance").
pub fn retroactive_conformances(inventory: &Inventory) -> Vec<&SwiftConformance> {
    inventory.conformances().iter().filter(|c| c.is_retroactive()).collect()
}

/// Every conformance gated by at least one generic requirement
/// (`spec.md` GLOSSARY "Conditional conformance").
pub fn conditional_conformances(inventory: &Inventory) -> Vec<&SwiftConformance> {
    inventory.conformances().iter().filter(|c| c.is_conditional()).collect()
}

/// Extensions of a given extended-type name, thinly wrapping the
/// `Inventory`'s own `extensions_by_type_name` index.
pub fn extensions_for_type<'a>(inventory: &'a Inventory, type_name: &str) -> Vec<&'a SwiftExtension> {
    inventory.extensions_for_type(type_name)
}

/// Conformances naming a given type, thinly wrapping the `Inventory`'s own
/// `conformances_by_type_name` index.
pub fn conformances_for_type<'a>(inventory: &'a Inventory, type_name: &str) -> Vec<&'a SwiftConformance> {
    inventory.conformances_for_type(type_name)
}

/// Conformances to a given protocol, thinly wrapping the `Inventory`'s own
/// `conformances_by_protocol_name` index.
pub fn conformances_for_protocol<'a>(inventory: &'a Inventory, protocol_name: &str) -> Vec<&'a SwiftConformance> {
    inventory.conformances_for_protocol(protocol_name)
}

/// Inheritance-depth summary, reproducing the source's literal (not true
/// chain-length) behaviour per `spec.md` §9's Open Question: a class with
/// any non-empty `superclassName` counts as depth 1, full stop. Exposing
/// both counts (rather than a single "average depth" figure) keeps that
/// shallowness visible to callers instead of dressing it up as real
/// inheritance-chain analysis.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct InheritanceStats {
    pub total_classes: usize,
    pub classes_with_superclass: usize,
}

impl InheritanceStats {
    /// Fraction of classes with at least depth-1 inheritance, `0.0` when
    /// there are no classes at all.
    pub fn ratio(&self) -> f64 {
        if self.total_classes == 0 {
            0.0
        } else {
            self.classes_with_superclass as f64 / self.total_classes as f64
        }
    }
}

pub fn inheritance_stats(inventory: &Inventory) -> InheritanceStats {
    let classes: Vec<&SwiftType> = types_by_kind(inventory, DescriptorKind::Class);
    let classes_with_superclass = classes.iter().filter(|c| c.superclass_name.is_some()).count();
    InheritanceStats { total_classes: classes.len(), classes_with_superclass }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConformanceFlags;

    fn sample_type(name: &str, kind: DescriptorKind, superclass: Option<&str>, generics: u16) -> SwiftType {
        SwiftType {
            address: 0,
            kind,
            name: name.to_string(),
            parent_name: None,
            parent_kind: None,
            superclass_name: superclass.map(str::to_string),
            generic_parameters: crate::model::synthesize_generic_param_names(generics),
            generic_param_count: generics,
            generic_requirements: vec![],
            flags: kind.wire_value(),
        }
    }

    fn sample_conformance(type_name: &str, protocol_name: &str, flags: u32) -> SwiftConformance {
        SwiftConformance {
            address: 0,
            type_ref_address: None,
            type_name: type_name.to_string(),
            mangled_type_name: String::new(),
            protocol_name: protocol_name.to_string(),
            protocol_address: None,
            flags: ConformanceFlags(flags),
        }
    }

    fn inventory_with(types: Vec<SwiftType>, conformances: Vec<SwiftConformance>) -> Inventory {
        crate::index::Inventory::collate(types, conformances, vec![], vec![])
    }

    #[test]
    fn inheritance_stats_counts_presence_not_depth() {
        let types = vec![
            sample_type("A", DescriptorKind::Class, Some("Foundation.NSObject"), 0),
            sample_type("B", DescriptorKind::Class, Some("A"), 0),
            sample_type("C", DescriptorKind::Class, None, 0),
            sample_type("D", DescriptorKind::Struct, None, 0),
        ];
        let inventory = inventory_with(types, vec![]);
        let stats = inheritance_stats(&inventory);
        assert_eq!(stats.total_classes, 3);
        assert_eq!(stats.classes_with_superclass, 2);
        assert!((stats.ratio() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn generic_types_filters_non_generic() {
        let types = vec![sample_type("Box", DescriptorKind::Struct, None, 1), sample_type("Plain", DescriptorKind::Struct, None, 0)];
        let inventory = inventory_with(types, vec![]);
        let generics = generic_types(&inventory);
        assert_eq!(generics.len(), 1);
        assert_eq!(generics[0].name, "Box");
    }

    #[test]
    fn retroactive_and_conditional_conformances_filter_independently() {
        let conformances = vec![
            sample_conformance("A", "Hashable", 0b1000),       // retroactive only
            sample_conformance("B", "Equatable", 0b1_0000_0000), // 1 conditional requirement
            sample_conformance("C", "Codable", 0),
        ];
        let inventory = inventory_with(vec![], conformances);
        assert_eq!(retroactive_conformances(&inventory).len(), 1);
        assert_eq!(conditional_conformances(&inventory).len(), 1);
    }
}
