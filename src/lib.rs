#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Fixed-capacity inline storage for trait objects.
//!
//! ## Overview
//!
//! A [`Poly<B, S>`] holds exactly one value of any type that implements the
//! base `B` (usually a `dyn Trait`), directly inside the container, without
//! allocating. Factories can return `Poly<dyn Shader>` by value and let the
//! caller decide whether the shader stays on the stack or moves to the heap.
//!
//! ```
//! use inline_poly::prelude::*;
//!
//! trait Shader {
//!     fn compile(&self) -> Result<u32, String>;
//! }
//!
//! struct GlShader {
//!     source: &'static str,
//! }
//!
//! struct NullShader;
//!
//! impl Shader for GlShader {
//!     fn compile(&self) -> Result<u32, String> {
//!         Ok(self.source.len() as u32)
//!     }
//! }
//!
//! impl Shader for NullShader {
//!     fn compile(&self) -> Result<u32, String> {
//!         Ok(0)
//!     }
//! }
//!
//! subtype!(dyn Shader: GlShader, NullShader);
//!
//! fn create(headless: bool) -> Poly<dyn Shader> {
//!     if headless {
//!         Poly::new(NullShader)
//!     } else {
//!         Poly::new(GlShader { source: "void main() {}" })
//!     }
//! }
//!
//! let shader = create(false);
//! assert_eq!(shader.compile(), Ok(14));
//!
//! // Keep it around after the factory's caller returns
//! let retained: Box<dyn Shader> = create(true).into_box();
//! assert_eq!(retained.compile(), Ok(0));
//! ```
//!
//! ## Core Concepts
//!
//! - **Base**: the type `B` the stored value is used through. A concrete type
//!   `U` may be stored if it implements [`Subtype<B>`], normally declared
//!   with the [`subtype!`] macro. Every type is a subtype of itself.
//! - **Space**: the type `S` whose size and alignment define the inline
//!   capacity. See [`space`]; the default is [`DefaultSpace`]. Storing a
//!   value that does not fit is a build error, never a runtime one.
//! - **Moves**: a `Poly` is moved like any other Rust value. It is never
//!   copied or cloned. [`Poly::swap`], [`Poly::take`] and [`Poly::replace`]
//!   move occupants between containers.
//! - **Promotion**: [`Poly::promote`], [`Poly::into_box`] and
//!   [`Poly::promote_shared`] move the occupant to the heap, leaving the
//!   container empty. [`PolyMap`] collects promoted values by name.
//! - **Hooks**: promotion is the only operation that allocates, and the only
//!   one that can be observed; see [`hooks`].
//!
//! ## Errors
//!
//! Using an empty container is a logic error, so [`Poly::get`], `Deref` and
//! the promotion methods panic on one. The `try_` methods return a
//! [`PolyError`] instead.
//!
//! ## Features
//!
//! - `std`: guard the hook table with [`std::sync::RwLock`] instead of a spin
//!   lock.
//!
//! For implementation details, see the [`inline-poly-internals`] crate.
//!
//! [`inline-poly-internals`]: inline_poly_internals

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

mod error;
pub mod hooks;
mod poly;
mod poly_map;
pub mod prelude;

pub use inline_poly_internals::{
    Subtype,
    space::{self, DefaultSpace},
};

pub use self::{
    error::{Operation, PolyError},
    poly::Poly,
    poly_map::PolyMap,
};
