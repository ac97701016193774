/// Resource bounds the walker and demangler enforce while decoding an image.
///
/// These mirror the hard ceilings in the format itself (generic parameter
/// counts are stored in a `u16`, but no sane Swift module declares more than
/// a handful); a caller embedding this crate in a sandboxed dump server can
/// tighten them further, but can never loosen them past the defaults, since
/// every limit is `min`-ed against its spec ceiling before use.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ReflectionLimits {
    /// Documents the type-argument / mixed-binary parser's recursion
    /// ceiling. The demangler (`demangle::demangle`) is also reachable as a
    /// pure free function with no `Inventory`/limits context, so it enforces
    /// this same ceiling via its own internal constant rather than reading
    /// it from a `ReflectionLimits` passed in by the caller; this field
    /// exists so a caller can still inspect and reason about the bound.
    max_recursion_depth: usize,
    /// Generic parameter counts outside `[1, max_generic_params]` are
    /// treated as "no generics".
    max_generic_params: u16,
    /// Generic requirement counts above `max_generic_requirements` are
    /// treated as zero.
    max_generic_requirements: u16,
}

const SPEC_MAX_RECURSION_DEPTH: usize = 10;
const SPEC_MAX_GENERIC_PARAMS: u16 = 16;
const SPEC_MAX_GENERIC_REQUIREMENTS: u16 = 32;

impl Default for ReflectionLimits {
    fn default() -> Self {
        Self {
            max_recursion_depth: SPEC_MAX_RECURSION_DEPTH,
            max_generic_params: SPEC_MAX_GENERIC_PARAMS,
            max_generic_requirements: SPEC_MAX_GENERIC_REQUIREMENTS,
        }
    }
}

impl ReflectionLimits {
    /// Builds a limit set tighter than the defaults. Values are clamped so
    /// that a caller can never exceed the spec's own ceilings.
    pub fn tightened(max_recursion_depth: usize, max_generic_params: u16, max_generic_requirements: u16) -> Self {
        Self {
            max_recursion_depth: max_recursion_depth.min(SPEC_MAX_RECURSION_DEPTH),
            max_generic_params: max_generic_params.min(SPEC_MAX_GENERIC_PARAMS),
            max_generic_requirements: max_generic_requirements.min(SPEC_MAX_GENERIC_REQUIREMENTS),
        }
    }

    pub fn max_recursion_depth(&self) -> usize {
        self.max_recursion_depth
    }

    pub fn max_generic_params(&self) -> u16 {
        self.max_generic_params
    }

    pub fn max_generic_requirements(&self) -> u16 {
        self.max_generic_requirements
    }
}
