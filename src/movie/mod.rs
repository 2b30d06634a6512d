pub mod composer;
pub mod view;

pub use composer::*;
pub use view::*;
