pub mod draw;
pub mod payment;
pub mod webhook;

pub use draw::draw_config;
pub use payment::payment_config;
pub use webhook::webhook_config;
