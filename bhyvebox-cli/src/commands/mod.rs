pub mod create;
pub mod list;
pub mod render;
pub mod start;
