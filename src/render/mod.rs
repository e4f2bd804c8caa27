pub mod cpu;
pub mod frame;
pub mod geometry;
pub mod palette;
pub mod text;
