pub mod common;
pub mod draw;
pub mod payment;

pub use common::*;
pub use draw::*;
pub use payment::*;
