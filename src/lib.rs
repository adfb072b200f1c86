//! Strata is a retained-mode 2D scene graph.
//!
//! Shapes are registered on named layers, each backed by its own drawing surface. Mutations mark
//! a layer dirty and coalesce into one repaint per host frame; exports flatten every layer into a
//! single encoded image.
//!
//! - Build a [`Scene`] from a host [`Container`], a [`Host`] and [`SceneOptions`]
//! - Add shapes through a [`LayerHandle`], optionally inside nested groups
//! - Export with [`Scene::to_data_url`] or [`Scene::to_blob`]
//!
//! [`HeadlessHost`] and [`CpuSurface`] render without a display.
#![forbid(unsafe_code)]

mod foundation;

/// Layers, the compositor and the export policy.
pub mod compose;
/// Host contracts and the headless CPU implementation.
pub mod host;
/// Drawing contexts, transforms and the z-ordered painter.
pub mod render;
/// Scene lifecycle and the layer builder API.
pub mod scene;
/// Shape kinds.
pub mod shapes;


pub use crate::foundation::color::ColorDef;
pub use crate::foundation::core::{
    Affine, BezPath, FrameRGBA, Meta, Point, Rect, ShapeId, Vec2, create_shape_id,
};
pub use crate::foundation::error::{StrataError, StrataResult};
pub use crate::foundation::ordered::OrderedMap;

pub use crate::compose::canvas::{Canvas, WeakCanvas};
pub use crate::compose::export::{Blob, ExportOptions, LayerExportOptions, target_size};
pub use crate::compose::layer::{Layer, LayerData, LayerParams, LayerRenderer};
pub use crate::host::cpu::CpuSurface;
pub use crate::host::encode::ImageFormat;
pub use crate::host::headless::{ContainerState, HeadlessContainer, HeadlessHost};
pub use crate::host::platform::{Container, FrameHandle, Host};
pub use crate::host::surface::{DrawContext, ImageData, ImageSource, Surface};
pub use crate::host::text::FontLibrary;
pub use crate::render::context::{DrawingContext, DrawingContextOptions, PartialShapeParams};
pub use crate::render::renderer::{RenderShapes, render_shapes};
pub use crate::render::transform::Transform;
pub use crate::scene::handle::{GroupScope, LayerHandle, ShapeSink};
pub use crate::scene::lifecycle::Scene;
pub use crate::scene::options::{AddShapeOptions, GroupOptions, RemoveOptions, SceneOptions};
pub use crate::shapes::base::{ReadyCallback, Shape, ShapeParams};
