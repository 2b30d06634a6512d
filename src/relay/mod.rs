pub mod envelope;
pub mod handlers;

pub use envelope::*;
pub use handlers::*;
