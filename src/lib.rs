#![allow(unused)]

//! Core decoder for Swift reflection metadata embedded in Mach-O images.
//!
//! This crate is the structural walker + name resolver described as the
//! "core" of a Swift reflection-metadata extractor: it turns the raw bytes
//! of the `__swift5_types`, `__swift5_proto` and `__swift5_fieldmd`
//! sections (plus the mangled/symbolic names they reference) into a
//! structured [`Inventory`] of Swift types, protocols, conformances,
//! extensions and field layouts.
//!
//! Locating the Mach-O image, parsing its load commands/segments and
//! resolving DYLD chained fixups is someone else's job; this crate only
//! consumes the small [`Image`]/[`ChainedFixups`] interface in
//! [`image`] that such a caller would implement.

pub mod analyzers;
pub mod demangle;
mod descriptors;
mod error;
pub mod image;
mod index;
mod limits;
pub mod model;
mod reader;

pub use error::ReflectError;
pub use image::{ByteOrder, ChainedFixups, FixupResolution, Image, Segment};
pub use index::Inventory;
pub use limits::ReflectionLimits;
pub use model::*;
pub use reader::ByteReader;
