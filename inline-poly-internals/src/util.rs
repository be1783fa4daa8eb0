//! Internal utility types.

/// Marker type used when type-erasing the value stored in a buffer.
///
/// This zero-sized type serves as the pointee of pointers into an
/// [`InlineBuffer`] whose occupant's concrete type is unknown at the current
/// scope. Only the vtable created alongside the occupant knows how to cast
/// such a pointer back.
///
/// Using a distinct marker type (rather than `()` or `u8`) makes the intent
/// clearer in signatures and keeps erased pointers from being mistaken for
/// byte pointers.
///
/// [`InlineBuffer`]: crate::poly::data::InlineBuffer
pub(crate) struct Erased;
