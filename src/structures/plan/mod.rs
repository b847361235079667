mod item;
mod plan;

pub use item::*;
pub use plan::*;
