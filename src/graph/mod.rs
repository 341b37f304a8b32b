pub mod adapter;
pub mod client;
pub mod sse;

pub use adapter::*;
pub use client::*;
