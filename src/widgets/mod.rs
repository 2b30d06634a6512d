//! Front-end view state, kept free of any rendering toolkit so the
//! transitions can be driven and tested directly.

pub mod chat;
pub mod client;
pub mod detail;
pub mod lists;

pub use chat::*;
pub use client::*;
pub use detail::*;
pub use lists::*;
