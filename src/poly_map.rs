//! A named collection of promoted values.
//!
//! Resources are usually created into a [`Poly`] by a backend factory and
//! then handed to a registry that outlives the factory call. [`PolyMap`] is
//! that registry: it promotes each container on insertion and keeps the
//! results in insertion order, keyed by name.

use alloc::{boxed::Box, string::String};
use core::fmt;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::{Poly, PolyError};

/// An insertion-ordered map from names to heap-owned values of base type `B`.
///
/// # Examples
///
/// ```
/// use inline_poly::{Poly, PolyMap, subtype};
///
/// trait Texture {
///     fn width(&self) -> u32;
/// }
///
/// struct Checkerboard;
///
/// impl Texture for Checkerboard {
///     fn width(&self) -> u32 {
///         64
///     }
/// }
///
/// subtype!(dyn Texture: Checkerboard);
///
/// let mut textures = PolyMap::<dyn Texture>::new();
/// textures.insert("checker", Poly::<dyn Texture>::new(Checkerboard))?;
///
/// assert_eq!(textures.get("checker").map(|t| t.width()), Some(64));
/// assert!(textures.get("missing").is_none());
/// # Ok::<(), inline_poly::PolyError>(())
/// ```
pub struct PolyMap<B: ?Sized + 'static> {
    entries: IndexMap<String, Box<B>, FxBuildHasher>,
}

impl<B: ?Sized + 'static> PolyMap<B> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::with_hasher(FxBuildHasher),
        }
    }

    /// Promotes the occupant of `poly` and stores it under `name`.
    ///
    /// If `name` was already present, its value is replaced in place (keeping
    /// its position) and the old value is returned.
    ///
    /// Any space `S` is accepted, so a container built inline at the call
    /// site needs its base spelled out, as in `Poly::<dyn Texture>::new(..)`.
    ///
    /// # Errors
    ///
    /// Returns an error, and leaves the map unchanged, if `poly` is empty.
    #[track_caller]
    pub fn insert<S>(
        &mut self,
        name: impl Into<String>,
        mut poly: Poly<B, S>,
    ) -> Result<Option<Box<B>>, PolyError> {
        let value = poly.try_promote()?;
        Ok(self.insert_boxed(name, value))
    }

    /// Stores an already promoted value under `name`, returning the value it
    /// replaces.
    pub fn insert_boxed(&mut self, name: impl Into<String>, value: Box<B>) -> Option<Box<B>> {
        self.entries.insert(name.into(), value)
    }

    /// Returns the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&B> {
        self.entries.get(name).map(|value| &**value)
    }

    /// Returns the value stored under `name` mutably.
    #[must_use]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut B> {
        self.entries.get_mut(name).map(|value| &mut **value)
    }

    /// Removes and returns the value stored under `name`.
    ///
    /// The remaining entries keep their relative order.
    pub fn remove(&mut self, name: &str) -> Option<Box<B>> {
        self.entries.shift_remove(name)
    }

    /// Whether a value is stored under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over names and values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &B)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), &**value))
    }

    /// Iterates over names and mutable values in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut B)> {
        self.entries
            .iter_mut()
            .map(|(name, value)| (name.as_str(), &mut **value))
    }

    /// Iterates over the names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<B: ?Sized + 'static> Default for PolyMap<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ?Sized + 'static> fmt::Debug for PolyMap<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
