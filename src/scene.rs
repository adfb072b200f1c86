pub mod handle;
pub mod lifecycle;
pub mod options;
