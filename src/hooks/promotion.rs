//! Hooks that observe values being promoted from inline storage to the heap.
//!
//! Promotion is the only place where a [`Poly`](crate::Poly) allocates, which
//! makes it the interesting event to watch when tuning which resources stay
//! inline. Construction, access, and destruction never consult the hook table.
//!
//! # Examples
//!
//! ## Counting every promotion
//!
//! ```rust
//! use core::sync::atomic::{AtomicUsize, Ordering};
//!
//! use inline_poly::{Poly, hooks::promotion::register_promotion_hook};
//!
//! static PROMOTIONS: AtomicUsize = AtomicUsize::new(0);
//!
//! register_promotion_hook(|_event: &inline_poly::hooks::promotion::PromotionEvent| {
//!     PROMOTIONS.fetch_add(1, Ordering::Relaxed);
//! });
//!
//! let boxed = Poly::<u64>::new(5).into_box();
//! assert_eq!(*boxed, 5);
//! assert!(PROMOTIONS.load(Ordering::Relaxed) >= 1);
//! ```
//!
//! ## Watching a single subtype
//!
//! ```rust
//! use inline_poly::{
//!     Poly,
//!     hooks::promotion::{PromotionEvent, PromotionHook, register_subtype_promotion_hook},
//! };
//!
//! struct FramebufferWatch;
//!
//! impl PromotionHook for FramebufferWatch {
//!     fn on_promote(&self, event: &PromotionEvent) {
//!         assert_eq!(event.size(), 8);
//!     }
//! }
//!
//! struct Framebuffer(u64);
//!
//! register_subtype_promotion_hook::<Framebuffer, _>(FramebufferWatch);
//! let _heap = Poly::<Framebuffer>::new(Framebuffer(1)).into_box();
//! ```

use alloc::vec::Vec;
use core::{any::TypeId, panic::Location};

use hashbrown::HashMap;
use triomphe::Arc;
use unsize::CoerceUnsize;

use crate::hooks::hook_lock::HookLock;

type HookList = Vec<Arc<dyn PromotionHook>>;

/// Hooks for all promotions, and hooks keyed by the promoted type.
#[derive(Default)]
struct HookTable {
    global: HookList,
    by_type: HashMap<TypeId, HookList, rustc_hash::FxBuildHasher>,
}

static HOOKS: HookLock<HookTable> = HookLock::new();

/// Where a promoted value ends up.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum PromotionKind {
    /// A uniquely owned [`Box`](alloc::boxed::Box).
    Unique,
    /// A reference-counted [`triomphe::Arc`].
    Shared,
}

/// Describes one promotion. Passed to every matching [`PromotionHook`].
#[derive(Copy, Clone, Debug)]
pub struct PromotionEvent {
    type_id: TypeId,
    type_name: &'static str,
    size: usize,
    capacity: usize,
    kind: PromotionKind,
    location: &'static Location<'static>,
}

impl PromotionEvent {
    pub(crate) fn new(
        type_id: TypeId,
        type_name: &'static str,
        size: usize,
        capacity: usize,
        kind: PromotionKind,
        location: &'static Location<'static>,
    ) -> Self {
        Self {
            type_id,
            type_name,
            size,
            capacity,
            kind,
            location,
        }
    }

    /// The [`TypeId`] of the promoted value.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The [`core::any::type_name`] of the promoted value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Size in bytes of the promoted value.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Inline capacity of the container the value left.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the value went into a `Box` or an `Arc`.
    #[must_use]
    pub fn kind(&self) -> PromotionKind {
        self.kind
    }

    /// The call site that requested the promotion.
    #[must_use]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

/// A hook that is called whenever a value is promoted to the heap.
///
/// Hooks run after the value has been moved to its heap allocation and
/// before the promotion returns. They must not assume anything about the
/// thread they run on.
///
/// Any `Fn(&PromotionEvent) + Send + Sync + 'static` closure is a hook.
pub trait PromotionHook: 'static + Send + Sync {
    /// Called once per promotion.
    fn on_promote(&self, event: &PromotionEvent);
}

impl<F> PromotionHook for F
where
    F: Fn(&PromotionEvent) + 'static + Send + Sync,
{
    fn on_promote(&self, event: &PromotionEvent) {
        self(event)
    }
}

fn into_shared<H: PromotionHook>(hook: H) -> Arc<dyn PromotionHook> {
    Arc::new(hook).unsize(unsize::Coercion!(to dyn PromotionHook))
}

/// Registers a hook that runs for every promotion in the program.
pub fn register_promotion_hook<H: PromotionHook>(hook: H) {
    let hook = into_shared(hook);
    HOOKS.update(|table| table.global.push(hook));
}

/// Registers a hook that only runs when a value of type `U` is promoted.
pub fn register_subtype_promotion_hook<U: 'static, H: PromotionHook>(hook: H) {
    let hook = into_shared(hook);
    HOOKS.update(|table| {
        table
            .by_type
            .entry(TypeId::of::<U>())
            .or_default()
            .push(hook);
    });
}

/// Removes every registered promotion hook.
///
/// This is the teardown counterpart of the `register_*` functions; call it
/// when the subsystem that installed the hooks shuts down.
pub fn clear_promotion_hooks() {
    HOOKS.write().reset();
}

/// Runs all hooks matching `event`.
///
/// The matching hooks are collected first so that the lock is released
/// before any hook runs; a hook may itself register hooks or promote values.
pub(crate) fn run_promotion_hooks(event: &PromotionEvent) {
    let hooks: HookList = {
        let guard = HOOKS.read();
        let Some(table) = guard.get() else {
            return;
        };
        table
            .global
            .iter()
            .chain(table.by_type.get(&event.type_id).into_iter().flatten())
            .cloned()
            .collect()
    };

    for hook in &hooks {
        hook.on_promote(event);
    }
}
