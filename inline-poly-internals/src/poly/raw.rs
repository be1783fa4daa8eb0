//! The owned, type-erased inline container.
//!
//! This module encapsulates the `buffer` and `vtable` fields of [`RawPoly`],
//! ensuring they are only visible within this module. This visibility
//! restriction guarantees the safety invariant: **the vtable is `Some` exactly
//! when the buffer holds an initialized value, and it was created for the type
//! of that value**.
//!
//! # Safety Invariant
//!
//! The only places that install a vtable are [`RawPoly::new`] and
//! [`RawPoly::set`], which write a `U` into the buffer and then install
//! `PolyVtable::new::<U>()`. Every operation that ends the occupant's lifetime
//! (clearing, dropping, promoting) takes the vtable out first, so the pair is
//! always cleared as one unit.
//!
//! # Relocation
//!
//! The buffer lives inside the [`RawPoly`] itself, so moving the container
//! moves the occupant's bytes with it. Rust moves never run constructors or
//! destructors, and a value that is not pinned may always be moved this way.
//! Because no pointer into the buffer is ever cached, a moved container is
//! immediately usable at its new address.

use alloc::boxed::Box;
use core::{any::TypeId, marker::PhantomData};

use triomphe::Arc;

use crate::{
    poly::{data::InlineBuffer, vtable::PolyVtable},
    space::DefaultSpace,
    subtype::Subtype,
};

/// A single-slot container that holds one value of some type `U` inline, in
/// storage shaped like `S`, and exposes it as the base type `B`.
///
/// The container is either empty or occupied. It never allocates except when
/// the occupant is promoted with [`promote`](RawPoly::promote) or
/// [`promote_shared`](RawPoly::promote_shared).
///
/// `RawPoly<B, S>` is `Send` or `Sync` exactly when `B` (and `S`) are, so a
/// `RawPoly<dyn Trait + Send>` may cross threads while a `RawPoly<dyn Trait>`
/// may not.
pub struct RawPoly<B: ?Sized + 'static, S = DefaultSpace> {
    /// The inline storage.
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. If `vtable` is `Some`, the buffer holds an initialized value of the
    ///    type the vtable was created for.
    /// 2. If `vtable` is `None`, the buffer is treated as uninitialized.
    buffer: InlineBuffer<S>,

    /// The operations bound to the occupant's type, or `None` when empty.
    vtable: Option<&'static PolyVtable<B>>,

    /// Marker to tell the compiler that we own a `B` for the purposes of
    /// auto traits and drop checking.
    _base: PhantomData<B>,
}

impl<B: ?Sized + 'static, S> RawPoly<B, S> {
    /// Number of bytes available for the occupant.
    pub const CAPACITY: usize = InlineBuffer::<S>::CAPACITY;

    /// Strictest alignment the occupant may require.
    pub const ALIGNMENT: usize = InlineBuffer::<S>::ALIGNMENT;

    /// Creates an empty container.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            buffer: InlineBuffer::uninit(),
            vtable: None,
            _base: PhantomData,
        }
    }

    /// Whether a value of type `U` fits in this container.
    #[inline]
    #[must_use]
    pub const fn fits<U>() -> bool {
        InlineBuffer::<S>::fits::<U>()
    }

    /// Creates a container holding `value`.
    ///
    /// Fails to compile if `U` is larger or more strictly aligned than `S`.
    #[inline]
    pub fn new<U: Subtype<B>>(value: U) -> Self {
        let mut this = Self::empty();
        this.buffer.write(value);
        // SAFETY: A `U` was just written to the buffer.
        unsafe {
            this.install::<U>();
        }
        this
    }

    /// Replaces the occupant with `value`, dropping the previous occupant if
    /// there was one.
    ///
    /// Fails to compile if `U` is larger or more strictly aligned than `S`.
    #[inline]
    pub fn set<U: Subtype<B>>(&mut self, value: U) {
        self.clear();
        self.buffer.write(value);
        // SAFETY: A `U` was just written to the buffer.
        unsafe {
            self.install::<U>();
        }
    }

    /// Installs the vtable for `U`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The buffer holds an initialized `U` that is not owned by anyone
    ///    else.
    #[inline]
    unsafe fn install<U: Subtype<B>>(&mut self) {
        self.vtable = Some(PolyVtable::new::<U>());
    }

    /// Whether the container holds a value.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.vtable.is_some()
    }

    /// Drops the occupant, leaving the container empty. Does nothing if the
    /// container is already empty.
    #[inline]
    pub fn clear(&mut self) {
        if let Some(vtable) = self.vtable.take() {
            // SAFETY:
            // 1. The vtable was `Some`, so the buffer holds an initialized value of the
            //    vtable's type, and we hold `&mut self`.
            // 2. The vtable has been taken out, so the container is now empty and will
            //    never drop or read the value again, even if the drop panics.
            unsafe {
                vtable.drop(self.buffer.as_mut_ptr());
            }
        }
    }

    /// Returns a reference to the occupant, or `None` when empty.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&B> {
        let vtable = self.vtable?;
        let ptr = vtable.project(self.buffer.as_ptr());
        // SAFETY: The vtable is `Some`, so the buffer holds an initialized value of
        // the vtable's type and `ptr` points to it. The pointer was derived from
        // `&self`, and the returned reference borrows `self`.
        Some(unsafe { ptr.as_ref() })
    }

    /// Returns a mutable reference to the occupant, or `None` when empty.
    #[inline]
    #[must_use]
    pub fn get_mut(&mut self) -> Option<&mut B> {
        let vtable = self.vtable?;
        let mut ptr = vtable.project(self.buffer.as_mut_ptr());
        // SAFETY: The vtable is `Some`, so the buffer holds an initialized value of
        // the vtable's type and `ptr` points to it. The pointer was derived from
        // `&mut self`, and the returned reference mutably borrows `self`.
        Some(unsafe { ptr.as_mut() })
    }

    /// Returns a reference to the occupant without checking that there is
    /// one.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The container is occupied.
    #[inline]
    #[must_use]
    pub unsafe fn get_unchecked(&self) -> &B {
        debug_assert!(self.is_occupied(), "accessed an empty container");
        // SAFETY:
        // 1. Guaranteed by the caller
        let vtable = unsafe { self.vtable.unwrap_unchecked() };
        let ptr = vtable.project(self.buffer.as_ptr());
        // SAFETY: The container is occupied, so `ptr` points to an initialized
        // value of the vtable's type.
        unsafe { ptr.as_ref() }
    }

    /// Returns a mutable reference to the occupant without checking that
    /// there is one.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The container is occupied.
    #[inline]
    #[must_use]
    pub unsafe fn get_unchecked_mut(&mut self) -> &mut B {
        debug_assert!(self.is_occupied(), "accessed an empty container");
        // SAFETY:
        // 1. Guaranteed by the caller
        let vtable = unsafe { self.vtable.unwrap_unchecked() };
        let mut ptr = vtable.project(self.buffer.as_mut_ptr());
        // SAFETY: The container is occupied, so `ptr` points to an initialized
        // value of the vtable's type.
        unsafe { ptr.as_mut() }
    }

    /// Moves the occupant into a new [`Box<B>`], leaving the container empty.
    ///
    /// Returns `None` if the container was already empty.
    #[inline]
    pub fn promote(&mut self) -> Option<Box<B>> {
        let vtable = self.vtable.take()?;
        // SAFETY:
        // 1. The vtable was `Some`, so the buffer holds an initialized value of the
        //    vtable's type.
        // 2. The vtable has been taken out, so the container treats the buffer as
        //    uninitialized from now on.
        Some(unsafe { vtable.promote(self.buffer.as_mut_ptr()) })
    }

    /// Moves the occupant into a new [`Arc<B>`], leaving the container empty.
    ///
    /// Returns `None` if the container was already empty.
    #[inline]
    pub fn promote_shared(&mut self) -> Option<Arc<B>> {
        let vtable = self.vtable.take()?;
        // SAFETY:
        // 1. The vtable was `Some`, so the buffer holds an initialized value of the
        //    vtable's type.
        // 2. The vtable has been taken out, so the container treats the buffer as
        //    uninitialized from now on.
        Some(unsafe { vtable.promote_shared(self.buffer.as_mut_ptr()) })
    }

    /// Returns the [`TypeId`] of the occupant, or `None` when empty.
    #[inline]
    #[must_use]
    pub fn stored_type_id(&self) -> Option<TypeId> {
        Some(self.vtable?.type_id())
    }

    /// Returns the [`core::any::type_name`] of the occupant, or `None` when
    /// empty.
    #[inline]
    #[must_use]
    pub fn stored_type_name(&self) -> Option<&'static str> {
        Some(self.vtable?.type_name())
    }

    /// Returns the size in bytes of the occupant, or `None` when empty.
    #[inline]
    #[must_use]
    pub fn stored_size(&self) -> Option<usize> {
        Some(self.vtable?.size())
    }
}

impl<B: ?Sized + 'static, S> Default for RawPoly<B, S> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl<B: ?Sized + 'static, S> core::ops::Drop for RawPoly<B, S> {
    #[inline]
    fn drop(&mut self) {
        self.clear();
    }
}
