//! Commonly used items for convenient importing.
//!
//! ```rust
//! use inline_poly::prelude::*;
//!
//! trait Light {
//!     fn lumens(&self) -> u32;
//! }
//!
//! struct Spot;
//!
//! impl Light for Spot {
//!     fn lumens(&self) -> u32 {
//!         800
//!     }
//! }
//!
//! subtype!(dyn Light: Spot);
//!
//! let mut lights = PolyMap::<dyn Light>::new();
//! lights.insert("key", Poly::<dyn Light>::new(Spot))?;
//! assert_eq!(lights.get("key").map(|l| l.lumens()), Some(800));
//! # Ok::<(), PolyError>(())
//! ```

pub use crate::{Poly, PolyError, PolyMap, Subtype, subtype};
