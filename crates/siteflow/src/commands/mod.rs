pub mod destroy;
pub mod graph;
pub mod outputs;
pub mod preview;
pub mod up;
pub mod validate;
