//! Crate-level integration tests for the literal demangling scenarios in
//! `spec.md` §8, run against the public `swift_reflect::demangle::demangle`
//! entry point rather than the module-internal unit tests.

use swift_reflect::demangle::demangle;

const TABLE: &[(&str, &str)] = &[
    ("_TtC10ModuleName9ClassName", "ModuleName.ClassName"),
    (
        "_TtCC13IDEFoundation22IDEBuildNoticeProvider16BuildLogObserver",
        "IDEFoundation.IDEBuildNoticeProvider.BuildLogObserver",
    ),
    ("_TtGC10ModuleName7GenericSS_", "ModuleName.Generic<String>"),
    ("_TtGC10ModuleName7PairMapSSSi_", "ModuleName.PairMap<String, Int>"),
    ("SaySiG", "[Int]"),
    ("SDySSSiG", "[String: Int]"),
    ("ShySSG", "Set<String>"),
    ("SiSg", "Int?"),
    ("ScTyyts5NeverOG", "Task<Void, Never>"),
];

#[test]
fn every_concrete_scenario_from_the_spec_table_matches() {
    for &(mangled, expected) in TABLE {
        assert_eq!(demangle(mangled), expected, "demangling {mangled:?}");
    }
}

#[test]
fn demangling_is_idempotent_for_every_table_output() {
    for &(_, expected) in TABLE {
        assert_eq!(demangle(expected), demangle(&demangle(expected)));
    }
}

#[test]
fn swift5_generic_optional_and_existential_forms() {
    // `$s` form of a plain struct in a user module.
    assert_eq!(demangle("$s10ModuleName3BoxV"), "ModuleName.Box");
    // Array-of-optional-int container.
    assert_eq!(demangle("SaySiSgG"), "[Int?]");
}

#[test]
fn unrecognised_fragments_round_trip_unchanged() {
    let input = "not a mangled name at all";
    assert_eq!(demangle(input), input);
}
