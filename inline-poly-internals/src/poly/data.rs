//! This module encapsulates the bytes of the [`InlineBuffer`]. Since this is
//! the only place they are visible, the only ways to put a value into the
//! buffer are [`InlineBuffer::write`], which checks at build time that the
//! value fits, and the raw pointers handed out below.

use core::{mem::MaybeUninit, ptr::NonNull};

use crate::util::Erased;

/// Uninterpreted storage with the size and alignment of `S`.
///
/// The buffer does not track whether it is occupied; that is the job of the
/// vtable stored next to it in [`RawPoly`](crate::RawPoly).
#[repr(transparent)]
pub(super) struct InlineBuffer<S> {
    /// The storage bytes. Never read or written as an `S`.
    bytes: MaybeUninit<S>,
}

impl<S> InlineBuffer<S> {
    /// Number of bytes available for the occupant.
    pub(super) const CAPACITY: usize = core::mem::size_of::<S>();

    /// Strictest alignment the occupant may require.
    pub(super) const ALIGNMENT: usize = core::mem::align_of::<S>();

    /// Creates an empty buffer.
    #[inline]
    pub(super) const fn uninit() -> Self {
        Self {
            bytes: MaybeUninit::uninit(),
        }
    }

    /// Whether a value of type `U` can be stored in this buffer.
    #[inline]
    pub(super) const fn fits<U>() -> bool {
        core::mem::size_of::<U>() <= Self::CAPACITY && core::mem::align_of::<U>() <= Self::ALIGNMENT
    }

    /// Fails the build when `U` does not fit.
    ///
    /// The check runs when this function is instantiated for a concrete
    /// `U`, so an oversized type is a compile error at the call site that
    /// names it, never a runtime failure.
    #[inline(always)]
    pub(super) fn assert_fits<U>() {
        const {
            assert!(
                core::mem::size_of::<U>() <= core::mem::size_of::<S>(),
                "the value is larger than the inline capacity of the container"
            );
            assert!(
                core::mem::align_of::<U>() <= core::mem::align_of::<S>(),
                "the value is more strictly aligned than the inline storage of the container"
            );
        }
    }

    /// Moves `value` into the buffer.
    ///
    /// Whatever the buffer held before is overwritten without being dropped;
    /// the caller is responsible for having cleared it first.
    #[inline]
    pub(super) fn write<U>(&mut self, value: U) {
        Self::assert_fits::<U>();
        let ptr: *mut U = self.bytes.as_mut_ptr().cast::<U>();

        // SAFETY:
        // - `assert_fits` guarantees that `size_of::<U>() <= size_of::<S>()`, so the
        //   write stays inside `bytes`.
        // - `assert_fits` guarantees that `align_of::<U>() <= align_of::<S>()`, and
        //   `bytes` is aligned for `S`, so `ptr` is aligned for `U`.
        // - We hold `&mut self`, so nothing else observes the bytes.
        unsafe {
            ptr.write(value);
        }
    }

    /// Returns a read-only pointer to the start of the buffer.
    #[inline]
    pub(super) fn as_ptr(&self) -> NonNull<Erased> {
        NonNull::from(&self.bytes).cast::<Erased>()
    }

    /// Returns a pointer to the start of the buffer that may be written
    /// through.
    #[inline]
    pub(super) fn as_mut_ptr(&mut self) -> NonNull<Erased> {
        NonNull::from(&mut self.bytes).cast::<Erased>()
    }
}
