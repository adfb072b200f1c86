pub mod context;
pub mod renderer;
pub mod transform;
