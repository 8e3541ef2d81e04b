pub mod month;
pub mod reference;

pub use month::{current_month, first_of_month, format_month, month_label, parse_month};
pub use reference::generate_payment_reference;
