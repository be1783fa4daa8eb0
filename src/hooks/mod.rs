//! Global hooks for observing containers.
//!
//! The container itself is `no_std` and never logs. Programs that want to
//! know when values leave inline storage register a
//! [`PromotionHook`](promotion::PromotionHook); see [`promotion`] for the
//! details and the `inline-poly-tracing` crate for a ready-made hook that
//! emits `tracing` events.
//!
//! Hooks are stored in a process-wide table guarded by a read/write lock.
//! With the `std` feature the lock is [`std::sync::RwLock`]; without it,
//! [`spin::RwLock`].

mod hook_lock;
pub mod promotion;
