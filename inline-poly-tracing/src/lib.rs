#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Tracing events for inline-poly heap promotions.
//!
//! A [`Poly`](inline_poly::Poly) only allocates when its occupant is
//! promoted to the heap. This crate reports each promotion as a `tracing`
//! event, so that resources which keep leaving inline storage show up in
//! your usual logs.
//!
//! # Quick Start
//!
//! ```
//! use inline_poly::Poly;
//! use tracing_subscriber::{Registry, layer::SubscriberExt};
//!
//! // 1. Any subscriber works; events use the `inline_poly` target
//! let subscriber = Registry::default().with(tracing_subscriber::fmt::layer());
//! tracing::subscriber::set_global_default(subscriber).expect("failed to set subscriber");
//!
//! // 2. Report every promotion in the program
//! inline_poly_tracing::install();
//!
//! // 3. Promote as usual
//! let boxed = Poly::<[u32; 4]>::new([1, 2, 3, 4]).into_box();
//! assert_eq!(boxed[3], 4);
//! ```
//!
//! Output:
//! ```text
//! DEBUG inline_poly: promoted value to the heap type_name="[u32; 4]" size=16 capacity=128 kind=Unique location=src/main.rs:13:54
//! ```
//!
//! # Environment Variables
//!
//! - `INLINE_POLY_TRACING` - Comma-separated options:
//!   - `trace`, `debug`, `info`, `warn`, `error` - The level of the emitted
//!     events (default `debug`)
//!   - `off` - Make [`install`] a no-op

use std::sync::OnceLock;

use inline_poly::hooks::promotion::{
    PromotionEvent, PromotionHook, clear_promotion_hooks, register_promotion_hook,
};
use tracing::Level;

/// The target of every event emitted by this crate.
pub const TARGET: &str = "inline_poly";

/// A promotion hook that emits one `tracing` event per promotion.
///
/// # Examples
///
/// Watching only one resource type, at a fixed level:
///
/// ```
/// use inline_poly::hooks::promotion::register_subtype_promotion_hook;
/// use inline_poly_tracing::TracingHook;
///
/// struct RenderTarget;
///
/// register_subtype_promotion_hook::<RenderTarget, _>(TracingHook {
///     level: tracing::Level::WARN,
/// });
/// ```
#[derive(Copy, Clone, Debug)]
pub struct TracingHook {
    /// The level of the emitted events.
    pub level: Level,
}

#[derive(Debug)]
struct InlinePolyTracingEnvOptions {
    level: Level,
    disabled: bool,
}

impl InlinePolyTracingEnvOptions {
    fn get() -> &'static Self {
        static INLINE_POLY_TRACING_FLAGS: OnceLock<InlinePolyTracingEnvOptions> = OnceLock::new();

        INLINE_POLY_TRACING_FLAGS.get_or_init(|| {
            let var = std::env::var_os("INLINE_POLY_TRACING");
            Self::parse(var.as_deref().map(|v| v.to_string_lossy()).as_deref())
        })
    }

    fn parse(var: Option<&str>) -> Self {
        let mut options = InlinePolyTracingEnvOptions {
            level: Level::DEBUG,
            disabled: false,
        };

        for v in var.unwrap_or_default().split(',').map(str::trim) {
            if v.eq_ignore_ascii_case("off") {
                options.disabled = true;
            } else if let Ok(level) = v.parse::<Level>() {
                options.level = level;
            }
        }

        options
    }
}

impl TracingHook {
    /// Creates a new [`TracingHook`] with the level taken from the
    /// environment.
    ///
    /// # Environment Variables
    ///
    /// - `INLINE_POLY_TRACING` - Comma-separated options:
    ///   - `trace`, `debug`, `info`, `warn`, `error` - The level of the
    ///     emitted events (default `debug`)
    pub fn new() -> Self {
        Self {
            level: InlinePolyTracingEnvOptions::get().level,
        }
    }
}

impl Default for TracingHook {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! promotion_event {
    ($level:expr, $event:expr) => {
        tracing::event!(
            target: TARGET,
            $level,
            type_name = $event.type_name(),
            size = $event.size(),
            capacity = $event.capacity(),
            kind = ?$event.kind(),
            location = %$event.location(),
            "promoted value to the heap"
        )
    };
}

impl PromotionHook for TracingHook {
    fn on_promote(&self, event: &PromotionEvent) {
        // `tracing::event!` needs the level as a constant
        if self.level == Level::TRACE {
            promotion_event!(Level::TRACE, event);
        } else if self.level == Level::DEBUG {
            promotion_event!(Level::DEBUG, event);
        } else if self.level == Level::INFO {
            promotion_event!(Level::INFO, event);
        } else if self.level == Level::WARN {
            promotion_event!(Level::WARN, event);
        } else {
            promotion_event!(Level::ERROR, event);
        }
    }
}

/// Registers a [`TracingHook`] for every promotion in the program.
///
/// Does nothing if `INLINE_POLY_TRACING` contains `off`. Calling it more
/// than once registers the hook more than once.
pub fn install() {
    if !InlinePolyTracingEnvOptions::get().disabled {
        register_promotion_hook(TracingHook::new());
    }
}

/// Removes every promotion hook, including the ones registered by
/// [`install`].
pub fn uninstall() {
    clear_promotion_hooks();
}
