//! A graphics backend that hands out shaders through a virtual constructor.
//!
//! `create_shader` picks a backend type at runtime and returns it inline as a
//! `Poly<dyn Shader + Send>`. Callers that only need the shader for the
//! current frame keep it on the stack; the long-lived ones are promoted into
//! the shader library.

use std::fmt;

use inline_poly::{
    Poly, PolyError, PolyMap,
    hooks::promotion::{PromotionEvent, clear_promotion_hooks, register_promotion_hook},
    subtype,
};

#[derive(Debug)]
struct CompileError {
    stage: Stage,
    reason: &'static str,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} shader failed to compile: {}", self.stage, self.reason)
    }
}

impl std::error::Error for CompileError {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Stage {
    Vertex,
    Fragment,
}

#[derive(Copy, Clone, Debug)]
enum Backend {
    OpenGl,
    Headless,
}

struct CreateInfo {
    backend: Backend,
    stage: Stage,
    source: &'static str,
}

trait Shader {
    fn stage(&self) -> Stage;
    fn compile(&mut self) -> Result<(), CompileError>;
    fn describe(&self) -> String;
}

struct GlShader {
    stage: Stage,
    source: &'static str,
    program: Option<u32>,
}

impl Shader for GlShader {
    fn stage(&self) -> Stage {
        self.stage
    }

    fn compile(&mut self) -> Result<(), CompileError> {
        if !self.source.contains("main") {
            return Err(CompileError {
                stage: self.stage,
                reason: "missing entry point",
            });
        }
        self.program = Some(self.source.len() as u32);
        Ok(())
    }

    fn describe(&self) -> String {
        match self.program {
            Some(program) => format!("GL program {program}"),
            None => "GL program (not compiled)".to_owned(),
        }
    }
}

#[derive(Default)]
struct NullShader {
    stage: Option<Stage>,
}

impl Shader for NullShader {
    fn stage(&self) -> Stage {
        self.stage.unwrap_or(Stage::Vertex)
    }

    fn compile(&mut self) -> Result<(), CompileError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "null shader".to_owned()
    }
}

subtype!(dyn Shader + Send: GlShader, NullShader);

fn create_shader(info: &CreateInfo) -> Poly<dyn Shader + Send> {
    match info.backend {
        Backend::OpenGl => Poly::new(GlShader {
            stage: info.stage,
            source: info.source,
            program: None,
        }),
        Backend::Headless => {
            let mut shader = Poly::<dyn Shader + Send>::new_default::<NullShader>();
            shader.set(NullShader {
                stage: Some(info.stage),
            });
            shader
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    register_promotion_hook(|event: &PromotionEvent| {
        println!(
            "promoted {} ({} of {} bytes) at {}",
            event.type_name(),
            event.size(),
            event.capacity(),
            event.location()
        );
    });

    let requests = [
        (
            "lit.vert",
            CreateInfo {
                backend: Backend::OpenGl,
                stage: Stage::Vertex,
                source: "void main() { gl_Position = vec4(0.0); }",
            },
        ),
        (
            "lit.frag",
            CreateInfo {
                backend: Backend::OpenGl,
                stage: Stage::Fragment,
                source: "void main() { color = vec4(1.0); }",
            },
        ),
        (
            "shadow.frag",
            CreateInfo {
                backend: Backend::Headless,
                stage: Stage::Fragment,
                source: "",
            },
        ),
    ];

    let mut library = PolyMap::<dyn Shader + Send>::new();
    for (name, info) in &requests {
        let mut shader = create_shader(info);
        shader.compile()?;
        library.insert(*name, shader)?;
    }

    // A temporary shader never leaves the stack
    let mut scratch = create_shader(&CreateInfo {
        backend: Backend::OpenGl,
        stage: Stage::Fragment,
        source: "// no entry point",
    });
    if let Err(error) = scratch.compile() {
        println!("scratch shader: {error}");
    }

    // Promoting it twice is a usage error
    let _first = scratch.promote();
    let Err(error): Result<_, PolyError> = scratch.try_promote() else {
        panic!("the container was emptied by the first promotion");
    };
    println!("second promotion: {error}");

    let library = std::thread::spawn(move || {
        for (name, shader) in library.iter() {
            println!("{name}: {:?} stage, {}", shader.stage(), shader.describe());
        }
        library
    })
    .join()
    .map_err(|_| "shader thread panicked")?;
    println!("{} shaders in library", library.len());

    clear_promotion_hooks();
    Ok(())
}
