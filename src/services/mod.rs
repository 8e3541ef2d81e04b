pub mod draw_service;
pub mod eligibility_service;
pub mod ledger_service;
pub mod notification_service;
pub mod payment_service;
pub mod winner_selection_service;

pub use draw_service::*;
pub use eligibility_service::*;
pub use ledger_service::*;
pub use notification_service::*;
pub use payment_service::*;
pub use winner_selection_service::*;
