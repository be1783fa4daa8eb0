//! The [`Poly`] container.

use alloc::boxed::Box;
use core::{
    any::TypeId,
    fmt,
    ops::{Deref, DerefMut},
    panic::Location,
};

use inline_poly_internals::{RawPoly, Subtype, space::DefaultSpace};
use triomphe::Arc;

use crate::{
    error::{Operation, PolyError},
    hooks::promotion::{PromotionEvent, PromotionKind, run_promotion_hooks},
};

/// An inline, single-slot box for one value of any subtype of `B`.
///
/// `B` is the base type the value is used through, usually a `dyn Trait`.
/// `S` is the storage space: a container can hold any `U: Subtype<B>` whose
/// size and alignment do not exceed those of `S` (see
/// [`space`](crate::space)).
///
/// A `Poly` never allocates. When a value has to outlive the container, or
/// be stored somewhere that does not know about the capacity `S`, it is
/// promoted to the heap with [`promote`](Poly::promote),
/// [`into_box`](Poly::into_box) or [`promote_shared`](Poly::promote_shared).
///
/// # Examples
///
/// ```
/// use inline_poly::{Poly, subtype};
///
/// trait Shader {
///     fn stage(&self) -> &'static str;
/// }
///
/// struct VertexShader {
///     program: u32,
/// }
///
/// impl Shader for VertexShader {
///     fn stage(&self) -> &'static str {
///         "vertex"
///     }
/// }
///
/// subtype!(dyn Shader: VertexShader);
///
/// let shader: Poly<dyn Shader> = Poly::new(VertexShader { program: 3 });
/// assert_eq!(shader.stage(), "vertex");
///
/// // Moving the container moves the shader with it
/// let moved = shader;
/// let boxed: Box<dyn Shader> = moved.into_box();
/// assert_eq!(boxed.stage(), "vertex");
/// ```
///
/// Values that do not fit are rejected when the program is built:
///
/// ```compile_fail
/// use inline_poly::{Poly, space::S1};
///
/// let _ = Poly::<[u64; 4], S1>::new([0; 4]);
/// ```
///
/// So are values that are not subtypes of the base:
///
/// ```compile_fail
/// use inline_poly::Poly;
///
/// trait Shader {}
/// struct NotAShader;
///
/// let _ = Poly::<dyn Shader>::new(NotAShader);
/// ```
///
/// And a container cannot be copied:
///
/// ```compile_fail
/// use inline_poly::Poly;
///
/// let a = Poly::<u32>::new(1);
/// let b: Poly<u32> = Poly::clone(&a);
/// ```
pub struct Poly<B: ?Sized + 'static, S = DefaultSpace> {
    raw: RawPoly<B, S>,
}

#[cold]
#[track_caller]
fn empty_container(operation: Operation) -> ! {
    panic!("{}", PolyError::empty(operation))
}

impl<B: ?Sized + 'static, S> Poly<B, S> {
    /// Number of bytes available for the occupant.
    pub const CAPACITY: usize = RawPoly::<B, S>::CAPACITY;

    /// Strictest alignment the occupant may require.
    pub const ALIGNMENT: usize = RawPoly::<B, S>::ALIGNMENT;

    /// Creates a container holding `value`.
    ///
    /// Fails to compile if `U` is larger or more strictly aligned than `S`.
    #[inline]
    #[must_use]
    pub fn new<U: Subtype<B>>(value: U) -> Self {
        Self {
            raw: RawPoly::new(value),
        }
    }

    /// Creates a container holding the value returned by `f`.
    ///
    /// ```
    /// use inline_poly::Poly;
    ///
    /// let name = Poly::<String>::new_with(|| "albedo".repeat(2));
    /// assert_eq!(&*name, "albedoalbedo");
    /// ```
    #[inline]
    #[must_use]
    pub fn new_with<U: Subtype<B>, F: FnOnce() -> U>(f: F) -> Self {
        Self::new(f())
    }

    /// Creates a container holding `U::default()`.
    ///
    /// ```
    /// use core::fmt::Debug;
    ///
    /// use inline_poly::{Poly, subtype};
    ///
    /// #[derive(Debug, Default)]
    /// struct NullTexture;
    ///
    /// subtype!(dyn Debug: NullTexture);
    ///
    /// let texture = Poly::<dyn Debug>::new_default::<NullTexture>();
    /// assert_eq!(format!("{:?}", &*texture), "NullTexture");
    /// ```
    #[inline]
    #[must_use]
    pub fn new_default<U: Subtype<B> + Default>() -> Self {
        Self::new(U::default())
    }

    /// Creates an empty container.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            raw: RawPoly::empty(),
        }
    }

    /// Replaces the occupant with `value`, dropping the previous occupant if
    /// there was one.
    ///
    /// This is how an emptied container is reused.
    #[inline]
    pub fn set<U: Subtype<B>>(&mut self, value: U) {
        self.raw.set(value);
    }

    /// Drops the occupant, if any, leaving the container empty.
    #[inline]
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Whether a value of type `U` fits in this container.
    ///
    /// ```
    /// use inline_poly::{
    ///     Poly,
    ///     space::{A16, S2},
    /// };
    ///
    /// #[repr(align(16))]
    /// struct Simd([f32; 4]);
    ///
    /// const _: () = assert!(Poly::<u64, S2>::fits::<[u32; 2]>());
    /// assert!(!Poly::<Simd, S2>::fits::<Simd>());
    /// assert!(Poly::<Simd, A16<S2>>::fits::<Simd>());
    /// ```
    #[inline]
    #[must_use]
    pub const fn fits<U>() -> bool {
        RawPoly::<B, S>::fits::<U>()
    }

    /// The inline capacity in bytes. Same as [`Poly::CAPACITY`].
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        Self::CAPACITY
    }

    /// Whether the container holds a value.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.raw.is_occupied()
    }

    /// Whether the container is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.raw.is_occupied()
    }

    /// Returns a reference to the occupant.
    ///
    /// # Panics
    ///
    /// Panics if the container is empty.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn get(&self) -> &B {
        match self.raw.get() {
            Some(value) => value,
            None => empty_container(Operation::Access),
        }
    }

    /// Returns a mutable reference to the occupant.
    ///
    /// # Panics
    ///
    /// Panics if the container is empty.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn get_mut(&mut self) -> &mut B {
        match self.raw.get_mut() {
            Some(value) => value,
            None => empty_container(Operation::Access),
        }
    }

    /// Returns a reference to the occupant, or an error if the container is
    /// empty.
    #[inline]
    pub fn try_get(&self) -> Result<&B, PolyError> {
        self.raw.get().ok_or(PolyError::empty(Operation::Access))
    }

    /// Returns a mutable reference to the occupant, or an error if the
    /// container is empty.
    #[inline]
    pub fn try_get_mut(&mut self) -> Result<&mut B, PolyError> {
        self.raw.get_mut().ok_or(PolyError::empty(Operation::Access))
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
        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { self.raw.get_unchecked() }
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
        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { self.raw.get_unchecked_mut() }
    }

    /// Exchanges the occupants of two containers.
    ///
    /// Both sides may be empty. No constructor or destructor runs.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.raw, &mut other.raw);
    }

    /// Moves the occupant into a new container, leaving `self` empty.
    #[inline]
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            raw: core::mem::take(&mut self.raw),
        }
    }

    /// Moves `other` into `self` and returns the previous occupant in its own
    /// container. Nothing is dropped.
    #[inline]
    #[must_use]
    pub fn replace(&mut self, other: Self) -> Self {
        core::mem::replace(self, other)
    }

    /// Moves the occupant into a new [`Box<B>`], leaving the container empty.
    ///
    /// Runs the registered [promotion hooks](crate::hooks::promotion).
    ///
    /// # Panics
    ///
    /// Panics if the container is empty.
    #[track_caller]
    pub fn promote(&mut self) -> Box<B> {
        match self.try_promote() {
            Ok(boxed) => boxed,
            Err(error) => empty_container(error.operation()),
        }
    }

    /// Moves the occupant into a new [`Box<B>`], or returns an error if the
    /// container is empty.
    ///
    /// Runs the registered [promotion hooks](crate::hooks::promotion) on
    /// success.
    #[track_caller]
    pub fn try_promote(&mut self) -> Result<Box<B>, PolyError> {
        let event = self.promotion_event(PromotionKind::Unique, Location::caller())?;
        let boxed = self
            .raw
            .promote()
            .ok_or(PolyError::empty(Operation::Promote))?;
        run_promotion_hooks(&event);
        Ok(boxed)
    }

    /// Consumes the container and moves its occupant into a [`Box<B>`].
    ///
    /// # Panics
    ///
    /// Panics if the container is empty.
    #[track_caller]
    pub fn into_box(mut self) -> Box<B> {
        self.promote()
    }

    /// Moves the occupant into a new reference-counted [`Arc<B>`], leaving
    /// the container empty.
    ///
    /// ```
    /// use inline_poly::Poly;
    ///
    /// let mut poly = Poly::<str>::empty();
    /// assert!(poly.try_get().is_err());
    ///
    /// let mut poly = Poly::<[u8; 3]>::new(*b"rgb");
    /// let shared = poly.promote_shared();
    /// let other = shared.clone();
    /// assert_eq!(&*other, b"rgb");
    /// assert!(poly.is_empty());
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the container is empty.
    #[track_caller]
    pub fn promote_shared(&mut self) -> Arc<B> {
        let event = match self.promotion_event(PromotionKind::Shared, Location::caller()) {
            Ok(event) => event,
            Err(error) => empty_container(error.operation()),
        };
        let Some(shared) = self.raw.promote_shared() else {
            empty_container(Operation::Promote)
        };
        run_promotion_hooks(&event);
        shared
    }

    fn promotion_event(
        &self,
        kind: PromotionKind,
        location: &'static Location<'static>,
    ) -> Result<PromotionEvent, PolyError> {
        let error = PolyError::empty(Operation::Promote);
        let type_id: TypeId = self.raw.stored_type_id().ok_or(error)?;
        let type_name = self.raw.stored_type_name().ok_or(error)?;
        let size = self.raw.stored_size().ok_or(error)?;
        Ok(PromotionEvent::new(
            type_id,
            type_name,
            size,
            Self::CAPACITY,
            kind,
            location,
        ))
    }
}

impl<B: ?Sized + 'static, S> Default for Poly<B, S> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl<B: ?Sized + 'static, S> Deref for Poly<B, S> {
    type Target = B;

    #[inline]
    #[track_caller]
    fn deref(&self) -> &B {
        self.get()
    }
}

impl<B: ?Sized + 'static, S> DerefMut for Poly<B, S> {
    #[inline]
    #[track_caller]
    fn deref_mut(&mut self) -> &mut B {
        self.get_mut()
    }
}

impl<B: ?Sized + 'static, S> fmt::Debug for Poly<B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw.stored_type_name() {
            Some(type_name) => f
                .debug_struct("Poly")
                .field("type", &type_name)
                .field("capacity", &Self::CAPACITY)
                .finish(),
            None => f.write_str("Poly(<empty>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, rc::Rc, string::String, vec::Vec};
    use core::cell::Cell;

    use super::*;
    use crate::space::{A16, S1, S2, S4};

    trait Mesh {
        fn vertices(&self) -> usize;
    }

    struct Counted {
        vertices: usize,
        drops: Rc<Cell<usize>>,
    }

    impl Drop for Counted {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    impl Mesh for Counted {
        fn vertices(&self) -> usize {
            self.vertices
        }
    }

    struct Quad;

    impl Mesh for Quad {
        fn vertices(&self) -> usize {
            4
        }
    }

    crate::subtype!(dyn Mesh: Counted, Quad);

    fn counted(vertices: usize, drops: &Rc<Cell<usize>>) -> Counted {
        Counted {
            vertices,
            drops: drops.clone(),
        }
    }

    #[test]
    fn test_single_destruction() {
        let drops = Rc::new(Cell::new(0));
        {
            let poly = Poly::<dyn Mesh, S4>::new(counted(3, &drops));
            assert_eq!(poly.vertices(), 3);
        }
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn test_move_empties_source() {
        let drops = Rc::new(Cell::new(0));
        let mut a = Poly::<dyn Mesh>::new(counted(8, &drops));

        let b = a.take();
        assert!(a.is_empty());
        drop(a);
        assert_eq!(drops.get(), 0);

        let c = b;
        assert_eq!(c.vertices(), 8);
        drop(c);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn test_promotion_round_trip() {
        let drops = Rc::new(Cell::new(0));
        let mut poly = Poly::<dyn Mesh>::new(counted(42, &drops));

        let boxed = poly.promote();
        assert_eq!(boxed.vertices(), 42);
        assert!(poly.is_empty());
        drop(poly);
        assert_eq!(drops.get(), 0);

        drop(boxed);
        assert_eq!(drops.get(), 1);

        let drops = Rc::new(Cell::new(0));
        let shared = Poly::<dyn Mesh>::new(counted(42, &drops)).promote_shared();
        assert_eq!(shared.clone().vertices(), 42);
        drop(shared);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn test_promote_shared_sized_base() {
        let mut poly = Poly::<u64>::new(42);
        let shared = poly.promote_shared();
        assert_eq!(*shared, 42);
        assert!(poly.is_empty());

        let bytes = Poly::<[u8; 3], S1>::new([1, 2, 3]).promote_shared();
        assert_eq!(*bytes, [1, 2, 3]);
    }

    #[test]
    fn test_capacity() {
        static_assertions::const_assert!(Poly::<dyn Mesh, S1>::fits::<Quad>());
        static_assertions::const_assert!(!Poly::<dyn Mesh, S2>::fits::<[usize; 3]>());
        static_assertions::const_assert!(!Poly::<dyn Mesh, S4>::fits::<A16<S1>>());

        let poly = Poly::<dyn Mesh, S2>::empty();
        assert_eq!(poly.capacity(), 2 * size_of::<usize>());
        assert_eq!(Poly::<dyn Mesh, A16<S1>>::ALIGNMENT, 16);
    }

    #[test]
    fn test_swap_symmetry() {
        let counted_drops = Rc::new(Cell::new(0));
        let mut a = Poly::<dyn Mesh>::new(counted(3, &counted_drops));
        let mut b = Poly::<dyn Mesh>::new(Quad);

        a.swap(&mut b);
        assert_eq!((a.vertices(), b.vertices()), (4, 3));

        drop(a);
        assert_eq!(counted_drops.get(), 0);
        drop(b);
        assert_eq!(counted_drops.get(), 1);

        let mut full = Poly::<dyn Mesh>::new(Quad);
        let mut empty = Poly::<dyn Mesh>::empty();
        full.swap(&mut empty);
        assert!(full.is_empty());
        assert_eq!(empty.vertices(), 4);
    }

    #[test]
    fn test_no_copy() {
        static_assertions::assert_not_impl_any!(Poly<dyn Mesh>: Clone, Copy);
        static_assertions::assert_not_impl_any!(Poly<u32, S1>: Clone, Copy);
    }

    #[test]
    fn test_replace() {
        let drops = Rc::new(Cell::new(0));
        let mut slot = Poly::<dyn Mesh>::new(counted(1, &drops));

        let previous = slot.replace(Poly::new(Quad));
        assert_eq!(drops.get(), 0);
        assert_eq!(previous.vertices(), 1);
        assert_eq!(slot.vertices(), 4);

        drop(previous);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn test_set_after_promotion() {
        let drops = Rc::new(Cell::new(0));
        let mut poly = Poly::<dyn Mesh>::new(counted(6, &drops));
        let promoted = poly.promote();

        poly.set(Quad);
        assert_eq!(poly.vertices(), 4);
        poly.set(counted(9, &drops));
        assert_eq!(poly.vertices(), 9);

        poly.clear();
        assert_eq!(drops.get(), 1);
        drop(promoted);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_checked_access() {
        let mut poly = Poly::<dyn Mesh>::empty();
        assert_eq!(
            poly.try_get().err(),
            Some(PolyError::empty(Operation::Access))
        );
        assert!(poly.try_get_mut().is_err());
        assert_eq!(
            poly.try_promote().err(),
            Some(PolyError::empty(Operation::Promote))
        );

        poly.set(Quad);
        assert_eq!(poly.try_get().map(|m| m.vertices()), Ok(4));
        // SAFETY: The container is occupied.
        assert_eq!(unsafe { poly.get_unchecked() }.vertices(), 4);
    }

    #[test]
    fn test_mutation() {
        let mut poly = Poly::<Vec<u32>, S4>::new_with(Vec::<u32>::new);
        poly.push(1);
        poly.get_mut().push(2);
        if let Ok(vertices) = poly.try_get_mut() {
            vertices.push(3);
        }
        // SAFETY: The container is occupied.
        unsafe { poly.get_unchecked_mut() }.push(4);
        assert_eq!(*poly, [1, 2, 3, 4]);
    }

    #[test]
    fn test_debug() {
        let poly = Poly::<dyn Mesh, S2>::new(Quad);
        let text = format!("{poly:?}");
        assert!(text.starts_with("Poly { type: \""));
        assert!(text.contains("Quad"));
        assert!(text.ends_with(&format!("capacity: {} }}", 2 * size_of::<usize>())));

        let empty = Poly::<dyn Mesh>::default();
        assert_eq!(format!("{empty:?}"), "Poly(<empty>)");
    }

    #[test]
    #[should_panic(expected = "cannot access an empty Poly")]
    fn test_deref_empty_panics() {
        let poly = Poly::<String>::empty();
        let _ = poly.len();
    }

    #[test]
    #[should_panic(expected = "cannot promote an empty Poly")]
    fn test_promote_empty_panics() {
        let mut poly = Poly::<dyn Mesh>::new(Quad);
        let _first = poly.promote();
        let _second = poly.promote();
    }

    #[test]
    #[should_panic(expected = "cannot promote an empty Poly")]
    fn test_promote_shared_empty_panics() {
        let _ = Poly::<dyn Mesh>::empty().promote_shared();
    }

    #[test]
    fn test_send_sync() {
        static_assertions::assert_not_impl_any!(Poly<dyn Mesh>: Send, Sync);
        static_assertions::assert_impl_all!(Poly<dyn Mesh + Send>: Send);
        static_assertions::assert_impl_all!(Poly<dyn Mesh + Send + Sync>: Send, Sync);
        static_assertions::assert_impl_all!(Poly<String>: Send, Sync);
    }
}
