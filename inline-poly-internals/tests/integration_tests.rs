//! Integration tests for the inline-poly-internals crate.
//!
//! The suite drives [`RawPoly`] through its public API with instrumented
//! stored types and checks the lifecycle guarantees the container makes:
//!
//! ## Lifecycle Tests
//! - `test_single_destruction`: one drop per stored value, at scope exit
//! - `test_move_empties_source`: moving never duplicates a drop
//! - `test_take_leaves_empty_source`: the move-construction form
//! - `test_promotion_round_trip`: state survives promotion to `Box`
//! - `test_shared_promotion_round_trip`: state survives promotion to `Arc`
//! - `test_swap_symmetry`: swapping exchanges occupants and their destructors
//!
//! ## Capacity and Type Tests
//! - `test_capacity_is_structural`: fit checks evaluated at compile time
//! - `test_no_copy`: the container is neither `Clone` nor `Copy`
//! - `test_reuse_after_promotion`: an emptied container accepts a new subtype
//! - `test_heterogeneous_collection`: promoted values stored as `Box<dyn _>`

use std::{any::TypeId, cell::Cell, mem, rc::Rc};

use inline_poly_internals::{
    RawPoly, Subtype,
    space::{DefaultSpace, S1, S2, S4},
};

trait Resource {
    fn handle(&self) -> u32;
    fn kind(&self) -> &'static str;
}

/// Drop counters shared between a test and the values it stores.
#[derive(Clone, Default)]
struct Counters {
    drops: Rc<Cell<usize>>,
}

impl Counters {
    fn drops(&self) -> usize {
        self.drops.get()
    }
}

struct CountedTexture {
    handle: u32,
    counters: Counters,
}

impl Drop for CountedTexture {
    fn drop(&mut self) {
        self.counters.drops.set(self.counters.drops.get() + 1);
    }
}

impl Resource for CountedTexture {
    fn handle(&self) -> u32 {
        self.handle
    }

    fn kind(&self) -> &'static str {
        "texture"
    }
}

struct CountedShader {
    handle: u32,
    uniforms: Vec<String>,
    counters: Counters,
}

impl Drop for CountedShader {
    fn drop(&mut self) {
        self.counters.drops.set(self.counters.drops.get() + 1);
    }
}

impl Resource for CountedShader {
    fn handle(&self) -> u32 {
        self.handle
    }

    fn kind(&self) -> &'static str {
        "shader"
    }
}

// SAFETY: Unsizing coercion.
unsafe impl Subtype<dyn Resource> for CountedTexture {
    fn upcast(ptr: *mut Self) -> *mut dyn Resource {
        ptr
    }
}

// SAFETY: Unsizing coercion.
unsafe impl Subtype<dyn Resource> for CountedShader {
    fn upcast(ptr: *mut Self) -> *mut dyn Resource {
        ptr
    }
}

fn texture(handle: u32, counters: &Counters) -> CountedTexture {
    CountedTexture {
        handle,
        counters: counters.clone(),
    }
}

fn shader(handle: u32, counters: &Counters) -> CountedShader {
    CountedShader {
        handle,
        uniforms: vec!["u_model".to_owned(), "u_view".to_owned()],
        counters: counters.clone(),
    }
}

#[test]
fn test_single_destruction() {
    let counters = Counters::default();
    {
        let poly = RawPoly::<dyn Resource>::new(texture(1, &counters));
        assert_eq!(poly.get().map(|r| r.handle()), Some(1));
        assert_eq!(counters.drops(), 0);
    }
    assert_eq!(counters.drops(), 1);

    let counters = Counters::default();
    {
        let mut poly = RawPoly::<dyn Resource>::new(shader(2, &counters));
        poly.clear();
        assert_eq!(counters.drops(), 1);
        poly.clear();
    }
    assert_eq!(counters.drops(), 1);
}

#[test]
fn test_move_empties_source() {
    let counters = Counters::default();
    let a = RawPoly::<dyn Resource>::new(texture(7, &counters));

    let b = a;
    assert_eq!(counters.drops(), 0);
    assert_eq!(b.get().map(|r| r.handle()), Some(7));

    // Moving into a function and back relocates the buffer twice
    fn relocate(poly: RawPoly<dyn Resource>) -> RawPoly<dyn Resource> {
        poly
    }
    let c = relocate(b);
    assert_eq!(c.get().map(|r| r.handle()), Some(7));
    assert_eq!(counters.drops(), 0);

    drop(c);
    assert_eq!(counters.drops(), 1);
}

#[test]
fn test_take_leaves_empty_source() {
    let counters = Counters::default();
    let mut a = RawPoly::<dyn Resource>::new(shader(3, &counters));

    let b = mem::take(&mut a);
    assert!(!a.is_occupied());
    assert!(b.is_occupied());

    drop(a);
    assert_eq!(counters.drops(), 0);
    drop(b);
    assert_eq!(counters.drops(), 1);
}

#[test]
fn test_promotion_round_trip() {
    let counters = Counters::default();
    let mut poly = RawPoly::<dyn Resource>::new(texture(42, &counters));

    let boxed: Box<dyn Resource> = poly.promote().expect("container is occupied");
    assert_eq!(boxed.handle(), 42);
    assert_eq!(boxed.kind(), "texture");
    assert!(!poly.is_occupied());

    drop(poly);
    assert_eq!(counters.drops(), 0);

    drop(boxed);
    assert_eq!(counters.drops(), 1);
}

#[test]
fn test_shared_promotion_round_trip() {
    let counters = Counters::default();
    let mut poly = RawPoly::<dyn Resource>::new(shader(42, &counters));

    let shared = poly.promote_shared().expect("container is occupied");
    let clone = shared.clone();
    assert_eq!(clone.handle(), 42);
    assert!(poly.promote_shared().is_none());

    drop(poly);
    drop(shared);
    assert_eq!(counters.drops(), 0);

    drop(clone);
    assert_eq!(counters.drops(), 1);
}

#[test]
fn test_swap_symmetry() {
    let texture_counters = Counters::default();
    let shader_counters = Counters::default();

    let mut a = RawPoly::<dyn Resource>::new(texture(1, &texture_counters));
    let mut b = RawPoly::<dyn Resource>::new(shader(2, &shader_counters));

    mem::swap(&mut a, &mut b);
    assert_eq!(a.get().map(|r| r.kind()), Some("shader"));
    assert_eq!(b.get().map(|r| r.kind()), Some("texture"));
    assert_eq!(a.stored_type_id(), Some(TypeId::of::<CountedShader>()));

    drop(a);
    assert_eq!((texture_counters.drops(), shader_counters.drops()), (0, 1));

    drop(b);
    assert_eq!((texture_counters.drops(), shader_counters.drops()), (1, 1));
}

#[test]
fn test_capacity_is_structural() {
    static_assertions::const_assert!(RawPoly::<dyn Resource, S1>::fits::<u64>());
    static_assertions::const_assert!(!RawPoly::<dyn Resource, S1>::fits::<[u64; 2]>());
    static_assertions::const_assert!(RawPoly::<dyn Resource, S2>::fits::<[usize; 2]>());
    static_assertions::const_assert!(RawPoly::<dyn Resource, DefaultSpace>::fits::<CountedShader>());
    static_assertions::const_assert!(!RawPoly::<dyn Resource, S4>::fits::<[usize; 5]>());

    assert_eq!(
        RawPoly::<dyn Resource, S4>::CAPACITY,
        4 * mem::size_of::<usize>()
    );
    assert_eq!(RawPoly::<dyn Resource, S4>::ALIGNMENT, mem::align_of::<usize>());
}

#[test]
fn test_no_copy() {
    static_assertions::assert_not_impl_any!(RawPoly<dyn Resource>: Clone, Copy);
    static_assertions::assert_not_impl_any!(RawPoly<u32>: Clone, Copy);
}

#[test]
fn test_reuse_after_promotion() {
    let texture_counters = Counters::default();
    let shader_counters = Counters::default();

    let mut poly = RawPoly::<dyn Resource>::new(texture(5, &texture_counters));
    let promoted = poly.promote().expect("container is occupied");

    poly.set(shader(6, &shader_counters));
    assert_eq!(poly.get().map(|r| r.kind()), Some("shader"));
    assert_eq!(texture_counters.drops(), 0);

    drop(poly);
    assert_eq!(shader_counters.drops(), 1);
    drop(promoted);
    assert_eq!(texture_counters.drops(), 1);
}

#[test]
fn test_heterogeneous_collection() {
    let counters = Counters::default();
    let mut resources: Vec<Box<dyn Resource>> = Vec::new();

    for handle in 0..4 {
        let mut poly = if handle % 2 == 0 {
            RawPoly::<dyn Resource>::new(texture(handle, &counters))
        } else {
            RawPoly::<dyn Resource>::new(shader(handle, &counters))
        };
        resources.extend(poly.promote());
    }

    let kinds: Vec<_> = resources.iter().map(|r| r.kind()).collect();
    assert_eq!(kinds, ["texture", "shader", "texture", "shader"]);
    assert_eq!(counters.drops(), 0);

    drop(resources);
    assert_eq!(counters.drops(), 4);
}

#[test]
fn test_mutation_through_base() {
    trait Uniforms {
        fn add(&mut self, name: &str);
        fn names(&self) -> &[String];
    }

    impl Uniforms for CountedShader {
        fn add(&mut self, name: &str) {
            self.uniforms.push(name.to_owned());
        }

        fn names(&self) -> &[String] {
            &self.uniforms
        }
    }

    // SAFETY: Unsizing coercion.
    unsafe impl Subtype<dyn Uniforms> for CountedShader {
        fn upcast(ptr: *mut Self) -> *mut dyn Uniforms {
            ptr
        }
    }

    let counters = Counters::default();
    let mut poly = RawPoly::<dyn Uniforms>::new(shader(9, &counters));
    poly.get_mut().expect("occupied").add("u_projection");

    let mut moved = poly;
    moved.get_mut().expect("occupied").add("u_time");
    assert_eq!(
        moved.get().expect("occupied").names(),
        ["u_model", "u_view", "u_projection", "u_time"]
    );
}
