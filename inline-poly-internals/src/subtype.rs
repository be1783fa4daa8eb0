//! The relation between a stored concrete type and the base it is viewed as.

use triomphe::Arc;
use unsize::{CoerceUnsize, Coercion};

/// Marks `Self` as a concrete type that can be stored in a container whose
/// base type is `B`.
///
/// In the engine `B` is almost always a trait object such as `dyn Shader`,
/// and `Self` is one backend implementation of it. The blanket
/// implementation `T: Subtype<T>` allows storing a concrete type as itself.
///
/// Implementations are normally generated by the `subtype!` macro of
/// `inline-poly`, which expands to exactly the implementation shown below.
///
/// # Safety
///
/// [`upcast`](Subtype::upcast) must return a pointer with the same address
/// as its argument and metadata that describes a `Self` viewed as `B`. In
/// practice this means its body must be a plain unsizing coercion
/// (`ptr` coerced to `*mut B`). Returning any other pointer makes every
/// container holding `Self` unsound.
///
/// A sized `B` other than `Self` cannot be reached by an unsizing coercion,
/// so the only implementation with a sized base is the blanket `T:
/// Subtype<T>`, which overrides [`upcast_arc`](Subtype::upcast_arc).
///
/// # Examples
///
/// ```
/// use inline_poly_internals::Subtype;
///
/// trait Texture {
///     fn handle(&self) -> u32;
/// }
///
/// struct GlTexture(u32);
///
/// impl Texture for GlTexture {
///     fn handle(&self) -> u32 {
///         self.0
///     }
/// }
///
/// // SAFETY: `upcast` is an unsizing coercion and keeps the address.
/// unsafe impl Subtype<dyn Texture> for GlTexture {
///     fn upcast(ptr: *mut Self) -> *mut dyn Texture {
///         ptr
///     }
/// }
/// ```
pub unsafe trait Subtype<B: ?Sized + 'static>: Sized + 'static {
    /// Views a pointer to `Self` as a pointer to the base `B`.
    fn upcast(ptr: *mut Self) -> *mut B;

    /// Views a shared `Arc<Self>` as an `Arc<B>`.
    ///
    /// The provided implementation attaches the metadata produced by
    /// [`upcast`](Subtype::upcast) and therefore requires `*const B` to be a
    /// wide pointer.
    #[inline]
    fn upcast_arc(this: Arc<Self>) -> Arc<B> {
        // SAFETY: The closure only performs `Subtype::upcast`, which by the
        // trait's safety contract keeps the address and only attaches
        // metadata.
        let coercion = unsafe {
            Coercion::new(|ptr: *const Self| -> *const B {
                Self::upcast(ptr.cast_mut()).cast_const()
            })
        };
        this.unsize(coercion)
    }
}

// SAFETY: The identity function keeps both the address and the metadata.
unsafe impl<T: 'static> Subtype<T> for T {
    #[inline]
    fn upcast(ptr: *mut Self) -> *mut T {
        ptr
    }

    #[inline]
    fn upcast_arc(this: Arc<Self>) -> Arc<T> {
        this
    }
}
