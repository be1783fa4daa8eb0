//! Logging heap promotions with `tracing`.
//!
//! Run with `INLINE_POLY_TRACING=info` to change the level of the events, or
//! with `INLINE_POLY_TRACING=off` to silence them.

use inline_poly::{Poly, PolyMap, subtype};
use tracing_subscriber::{Registry, layer::SubscriberExt};

trait Mesh {
    fn triangles(&self) -> usize;
}

struct Cube;

struct Terrain {
    heights: [f32; 64],
}

impl Mesh for Cube {
    fn triangles(&self) -> usize {
        12
    }
}

impl Mesh for Terrain {
    fn triangles(&self) -> usize {
        self.heights.len() * 2
    }
}

subtype!(dyn Mesh: Cube, Terrain);

fn main() {
    let subscriber = Registry::default().with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber).expect("failed to set default subscriber");

    inline_poly_tracing::install();

    // Staying inline emits nothing
    let cube = Poly::<dyn Mesh>::new(Cube);
    println!("inline cube: {} triangles", cube.triangles());

    // Each promotion emits one event
    let mut meshes = PolyMap::<dyn Mesh>::new();
    meshes.insert("cube", cube).expect("cube is occupied");
    meshes
        .insert("terrain", Poly::<dyn Mesh, [f32; 64]>::new(Terrain { heights: [0.0; 64] }))
        .expect("terrain is occupied");

    for (name, mesh) in meshes.iter() {
        println!("{name}: {} triangles", mesh.triangles());
    }

    inline_poly_tracing::uninstall();
}
