//! Module containing the inline container

mod data;
mod raw;
mod vtable;

pub use self::raw::RawPoly;
