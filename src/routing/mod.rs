pub mod builder;
pub mod router;
pub mod transport_router;

pub use builder::*;
pub use router::*;
pub use transport_router::*;
