use crate::host::surface::DrawContext;
use crate::render::context::DrawingContext;

/// Signature of the default painter, handed to custom layer renderers so they can delegate.
pub type RenderShapes = fn(&mut dyn DrawContext, &[&DrawingContext]);

/// Paint `shapes` in ascending z-index order. Equal z-indices keep their input order. Each shape
/// is wrapped in its own save/restore, so alpha and transforms never carry over.
pub fn render_shapes(ctx: &mut dyn DrawContext, shapes: &[&DrawingContext]) {
    let mut sorted = shapes.to_vec();
    sorted.sort_by_key(|s| s.shape_params().z_index);

    for shape in sorted {
        ctx.save();
        ctx.set_global_alpha(shape.shape_params().opacity);
        shape.transform(ctx);
        shape.draw(ctx);
        ctx.restore();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
