pub mod mailer;
pub mod paystack;

pub use mailer::*;
pub use paystack::*;
