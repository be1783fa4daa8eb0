//! Storage spaces that define the inline capacity of a container.
//!
//! The capacity of a `RawPoly<B, S>` is expressed by the size of the type
//! parameter `S`, and its alignment by the alignment of `S`. The space type is
//! never constructed or read as an `S`; only its layout matters.
//!
//! This module provides `S1` through `S64`, representing `n` machine words,
//! and [`A16`] for raising the alignment of any space to 16 bytes. Any other
//! sized type works too, e.g. `[u8; 24]` or a `#[repr(align(64))]` struct.
//!
//! The whole engine shares [`DefaultSpace`], trading some wasted bytes for a
//! single container type at every call site.

/// One machine word.
pub type S1 = [usize; 1];
/// Two machine words.
pub type S2 = [usize; 2];
/// Four machine words.
pub type S4 = [usize; 4];
/// Eight machine words.
pub type S8 = [usize; 8];
/// Sixteen machine words.
pub type S16 = [usize; 16];
/// Thirty-two machine words.
pub type S32 = [usize; 32];
/// Sixty-four machine words.
pub type S64 = [usize; 64];

/// The capacity used when a container does not name one.
///
/// Sixteen machine words: large enough for every graphics resource wrapper in
/// the engine.
pub type DefaultSpace = S16;

/// Raises the alignment of the space `S` to 16 bytes.
///
/// Needed for values containing SIMD types or `#[repr(align(16))]` fields.
///
/// ```
/// use inline_poly_internals::space::{A16, S4};
///
/// assert_eq!(core::mem::align_of::<A16<S4>>(), 16);
/// assert!(core::mem::size_of::<A16<S4>>() >= core::mem::size_of::<S4>());
/// ```
#[derive(Clone, Copy, Debug, Default)]
#[repr(C, align(16))]
pub struct A16<S>(pub S);
