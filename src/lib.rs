// Library exports for scatter3d

pub mod axis;
pub mod coerce;
pub mod color;
pub mod data;
pub mod defaults;
pub mod error_bars;
pub mod headless;
pub mod layout;
pub mod scatter;
pub mod scene;
pub mod schema;

// Resolution and rendering pipeline
pub mod ir;
pub mod compiler;
pub mod runtime;

pub use compiler::compile_params;
pub use defaults::{supply_defaults, Defaults};
pub use ir::{RenderParams, ResolvedSeries};
pub use layout::{LayoutContext, SceneLayout};
pub use runtime::plot;
pub use scene::{ObjectRegistry, RenderObject, Renderer, Scene, SceneObject};
