//! The lock guarding a hook table.
//!
//! Every kind of hook owns one `static` table behind its own [`HookLock`]
//! (today only the promotion table in [`super::promotion`]), so registering
//! one kind of hook never contends with running another.

#[cfg(feature = "std")]
use std::sync as impl_;

#[cfg(not(feature = "std"))]
use spin as impl_;

/// A lazily populated, globally shared hook table.
///
/// Backed by [`std::sync::RwLock`] when the `std` feature is enabled and by
/// [`spin::RwLock`] otherwise.
///
/// The table is wrapped in an `Option` because its collections cannot be
/// built in a `const` context: `None` lets the lock itself be a `static`
/// initialised by [`HookLock::new`], and it is also what a promotion sees
/// on the fast path when no hook was ever registered. The first
/// registration allocates the table with [`HookLock::update`], and
/// [`HookLockWriteGuard::reset`] returns the lock to `None` on teardown.
#[repr(transparent)]
pub(crate) struct HookLock<T: 'static + Send + Sync>(impl_::RwLock<Option<T>>);

#[repr(transparent)]
pub(crate) struct HookLockReadGuard<T: 'static + Send + Sync>(
    impl_::RwLockReadGuard<'static, Option<T>>,
);

#[repr(transparent)]
pub(crate) struct HookLockWriteGuard<T: 'static + Send + Sync>(
    impl_::RwLockWriteGuard<'static, Option<T>>,
);

impl<T: 'static + Send + Sync> HookLock<T> {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self(impl_::RwLock::new(None))
    }

    #[inline]
    pub(crate) fn read(&'static self) -> HookLockReadGuard<T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.read();

        // Hooks never run while the lock is held, so it cannot be poisoned by
        // a panicking hook.
        #[cfg(feature = "std")]
        let guard = self.0.read().expect("Unable to acquire hook lock");

        HookLockReadGuard(guard)
    }

    #[inline]
    pub(crate) fn write(&'static self) -> HookLockWriteGuard<T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.write();

        #[cfg(feature = "std")]
        let guard = self.0.write().expect("Unable to acquire hook lock");

        HookLockWriteGuard(guard)
    }

    /// Runs `f` on the table under the write lock, creating an empty table
    /// first if none exists yet.
    #[inline]
    pub(crate) fn update<R>(&'static self, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: Default,
    {
        f(self.write().get().get_or_insert_default())
    }
}

impl<T: 'static + Send + Sync> HookLockReadGuard<T> {
    #[inline]
    pub(crate) fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }
}

impl<T: 'static + Send + Sync> HookLockWriteGuard<T> {
    #[inline]
    pub(crate) fn get(&mut self) -> &mut Option<T> {
        &mut self.0
    }

    /// Drops the whole table, returning the lock to its initial state.
    #[inline]
    pub(crate) fn reset(&mut self) -> Option<T> {
        self.0.take()
    }
}
