#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`inline-poly`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased storage and the unsafe
//! operations behind the [`inline-poly`] container. A [`RawPoly<B, S>`] holds
//! one value of some concrete type `U` directly inside a buffer shaped like
//! `S`, and accesses it only through the base type `B` (usually a
//! `dyn Trait`).
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on [`inline-poly`], not this
//! one.
//!
//! # Architecture
//!
//! - **[`space`]**: Storage shapes that define the inline capacity and
//!   alignment of a container.
//! - **[`subtype`]**: The [`Subtype`] trait, the only place where the
//!   relation between a concrete type and its base is expressed.
//! - **`poly`**: The container itself
//!   - [`RawPoly`]: Owned, inline, single-slot storage
//!   - [`InlineBuffer`]: Uninterpreted bytes plus the build-time fit check
//!   - [`PolyVtable`]: Function pointers bound to the stored type
//!
//! # Safety Strategy
//!
//! Once a value of type `U` is written into the buffer, its type is only
//! known to the vtable that was created next to it. The crate keeps the two
//! in sync through:
//!
//! - **Module-based encapsulation**: the buffer and the vtable are private
//!   fields of [`RawPoly`], so the only way to set them is the constructor,
//!   which writes both from the same `U`.
//! - **One `'static` vtable per type**: destruction, projection, and both
//!   promotion paths live in a single table, so they are present or absent
//!   together.
//! - **Address-based projection**: the pointer to `B` is recomputed from the
//!   buffer's current address on every access, so moving the container
//!   (a plain byte copy in Rust) never leaves a stale pointer behind.
//!
//! [`inline-poly`]: https://docs.rs/inline-poly/latest/inline_poly/
//! [`InlineBuffer`]: poly::data::InlineBuffer
//! [`PolyVtable`]: poly::vtable::PolyVtable
//! [`Subtype`]: subtype::Subtype

extern crate alloc;

mod poly;
pub mod space;
pub mod subtype;
mod util;

pub use poly::RawPoly;
pub use subtype::Subtype;
