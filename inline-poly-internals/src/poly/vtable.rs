//! Vtable for type-erased container operations.
//!
//! This module contains the [`PolyVtable`] which enables destroying,
//! accessing, and promoting the value in an [`InlineBuffer`] when its concrete
//! type `U` has been erased. The vtable stores function pointers that dispatch
//! to the correct typed implementations.
//!
//! This module encapsulates the fields of [`PolyVtable`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's type parameter must match the actual type of the
//! value stored in the buffer it is paired with**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`PolyVtable::new`], which pairs the function pointers with
//! a specific type `U` at compile time, and [`RawPoly`] only ever installs a
//! vtable right after writing a value of that same `U`.
//!
//! [`InlineBuffer`]: crate::poly::data::InlineBuffer
//! [`RawPoly`]: crate::RawPoly

use alloc::boxed::Box;
use core::{any::TypeId, ptr::NonNull};

use triomphe::Arc;

use crate::{subtype::Subtype, util::Erased};

/// Vtable for type-erased container operations.
///
/// Contains function pointers for operating on a stored value through its
/// base type `B` without knowing its concrete type at compile time.
///
/// # Safety Invariant
///
/// The fields `project`, `drop`, `promote`, and `promote_shared` are
/// guaranteed to point to the functions defined below instantiated with the
/// stored type `U` that was used to create this [`PolyVtable`].
pub(crate) struct PolyVtable<B: ?Sized + 'static> {
    /// Gets the [`TypeId`] of the stored type.
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the stored type.
    type_name: fn() -> &'static str,
    /// Size in bytes of the stored type.
    size: usize,
    /// Views the buffer address as a pointer to the base type.
    project: fn(NonNull<Erased>) -> NonNull<B>,
    /// Drops the stored value in place.
    drop: unsafe fn(NonNull<Erased>),
    /// Moves the stored value into a new [`Box`].
    promote: unsafe fn(NonNull<Erased>) -> Box<B>,
    /// Moves the stored value into a new [`Arc`].
    promote_shared: unsafe fn(NonNull<Erased>) -> Arc<B>,
}

impl<B: ?Sized + 'static> PolyVtable<B> {
    /// Creates a new [`PolyVtable`] for the stored type `U`.
    pub(super) const fn new<U: Subtype<B>>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<U>,
                type_name: core::any::type_name::<U>,
                size: core::mem::size_of::<U>(),
                project: project::<U, B>,
                drop: drop::<U>,
                promote: promote::<U, B>,
                promote_shared: promote_shared::<U, B>,
            }
        }
    }

    /// Gets the [`TypeId`] of the stored type.
    #[inline]
    pub(super) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the [`core::any::type_name`] of the stored type.
    #[inline]
    pub(super) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Size in bytes of the stored type.
    #[inline]
    pub(super) fn size(&self) -> usize {
        self.size
    }

    /// Views a buffer address as a pointer to the base type.
    ///
    /// The returned pointer inherits the provenance of `ptr`. It is only
    /// meaningful to dereference it when the buffer actually holds a value of
    /// the type this vtable was created for.
    #[inline]
    pub(super) fn project(&self, ptr: NonNull<Erased>) -> NonNull<B> {
        (self.project)(ptr)
    }

    /// Drops the value stored at `ptr` in place.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized value of the type this
    ///    [`PolyVtable`] was created for, and is valid for writes.
    /// 2. This method ends the lifetime of that value, so the caller must
    ///    ensure that it has not previously been dropped or moved out, and
    ///    that it is not used after calling this method.
    #[inline]
    pub(super) unsafe fn drop(&self, ptr: NonNull<Erased>) {
        // SAFETY: We know that `self.drop` points to the function `drop::<U>` below.
        // That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe {
            (self.drop)(ptr);
        }
    }

    /// Moves the value stored at `ptr` into a new [`Box<B>`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized value of the type this
    ///    [`PolyVtable`] was created for.
    /// 2. This method moves the value out, so the caller must treat the
    ///    memory behind `ptr` as uninitialized afterwards and must never drop
    ///    it again.
    #[inline]
    pub(super) unsafe fn promote(&self, ptr: NonNull<Erased>) -> Box<B> {
        // SAFETY: We know that `self.promote` points to the function
        // `promote::<U, B>` below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.promote)(ptr) }
    }

    /// Moves the value stored at `ptr` into a new [`Arc<B>`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized value of the type this
    ///    [`PolyVtable`] was created for.
    /// 2. This method moves the value out, so the caller must treat the
    ///    memory behind `ptr` as uninitialized afterwards and must never drop
    ///    it again.
    #[inline]
    pub(super) unsafe fn promote_shared(&self, ptr: NonNull<Erased>) -> Arc<B> {
        // SAFETY: We know that `self.promote_shared` points to the function
        // `promote_shared::<U, B>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.promote_shared)(ptr) }
    }
}

/// Views a buffer address as a pointer to the base type `B`, assuming it
/// holds a `U`.
fn project<U: Subtype<B>, B: ?Sized + 'static>(ptr: NonNull<Erased>) -> NonNull<B> {
    let ptr: *mut U = ptr.cast::<U>().as_ptr();
    let base: *mut B = U::upcast(ptr);

    // SAFETY: `Subtype::upcast` returns a pointer with the same address as its
    // argument, which came from a `NonNull`.
    unsafe { NonNull::new_unchecked(base) }
}

/// Drops the `U` stored at `ptr` in place.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to an initialized `U` and is valid for writes.
/// 2. The value has not previously been dropped or moved out, and is not used
///    after calling this function.
unsafe fn drop<U>(ptr: NonNull<Erased>) {
    let ptr: *mut U = ptr.cast::<U>().as_ptr();

    // SAFETY:
    // 1. Guaranteed by the caller
    // 2. Guaranteed by the caller
    unsafe {
        core::ptr::drop_in_place(ptr);
    }
}

/// Moves the `U` stored at `ptr` into a new [`Box<B>`].
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to an initialized `U`.
/// 2. The caller treats the memory behind `ptr` as uninitialized afterwards.
unsafe fn promote<U: Subtype<B>, B: ?Sized + 'static>(ptr: NonNull<Erased>) -> Box<B> {
    // SAFETY:
    // 1. Guaranteed by the caller
    // 2. Ownership of the value moves to `value`; the caller never drops the
    //    original again.
    let value: U = unsafe { ptr.cast::<U>().as_ptr().read() };

    let boxed: *mut U = Box::into_raw(Box::new(value));
    let boxed: *mut B = U::upcast(boxed);

    // SAFETY: `boxed` came from `Box::<U>::into_raw`, and `Subtype::upcast` kept
    // its address while attaching the metadata of `U` viewed as `B`. The size
    // and alignment described by that metadata are those of `U`, so the
    // resulting `Box<B>` deallocates with the same layout it was allocated
    // with.
    unsafe { Box::from_raw(boxed) }
}

/// Moves the `U` stored at `ptr` into a new [`Arc<B>`].
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to an initialized `U`.
/// 2. The caller treats the memory behind `ptr` as uninitialized afterwards.
unsafe fn promote_shared<U: Subtype<B>, B: ?Sized + 'static>(ptr: NonNull<Erased>) -> Arc<B> {
    // SAFETY:
    // 1. Guaranteed by the caller
    // 2. Ownership of the value moves to `value`; the caller never drops the
    //    original again.
    let value: U = unsafe { ptr.cast::<U>().as_ptr().read() };

    U::upcast_arc(Arc::new(value))
}
