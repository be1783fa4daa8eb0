/// Declares concrete types as subtypes of a base, so they can be stored in a
/// [`Poly`](crate::Poly) of that base.
///
/// The first argument is the base type, usually a trait object. Each type
/// after the colon must implement it; the macro expands to one
/// [`Subtype`](crate::Subtype) implementation per type, each a plain
/// unsizing coercion.
///
/// Auto traits are part of the base, so a type that should be stored in both
/// a `Poly<dyn Shader>` and a `Poly<dyn Shader + Send>` is declared for both.
///
/// # Examples
///
/// ```
/// use inline_poly::{Poly, subtype};
///
/// trait Sampler {
///     fn filter(&self) -> &'static str;
/// }
///
/// struct Linear;
/// struct Nearest;
///
/// impl Sampler for Linear {
///     fn filter(&self) -> &'static str {
///         "linear"
///     }
/// }
///
/// impl Sampler for Nearest {
///     fn filter(&self) -> &'static str {
///         "nearest"
///     }
/// }
///
/// subtype!(dyn Sampler: Linear, Nearest);
/// subtype!(dyn Sampler + Send + Sync: Linear);
///
/// let samplers: [Poly<dyn Sampler>; 2] = [Poly::new(Linear), Poly::new(Nearest)];
/// assert_eq!(samplers[1].filter(), "nearest");
///
/// let shared: Poly<dyn Sampler + Send + Sync> = Poly::new(Linear);
/// std::thread::spawn(move || assert_eq!(shared.filter(), "linear"))
///     .join()
///     .unwrap();
/// ```
#[macro_export]
macro_rules! subtype {
    ($base:ty: $($subtype:ty),+ $(,)?) => {
        $(
            // SAFETY: `upcast` is an unsizing coercion, which keeps the address.
            unsafe impl $crate::Subtype<$base> for $subtype {
                #[inline]
                fn upcast(ptr: *mut Self) -> *mut $base {
                    ptr
                }
            }
        )+
    };
}
