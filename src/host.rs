pub mod composite;
pub mod cpu;
pub mod decode;
pub mod encode;
pub mod headless;
pub mod platform;
pub mod surface;
pub mod text;
