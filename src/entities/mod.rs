pub mod job_listings;
pub mod monthly_draws;
pub mod payments;
pub mod registrations;
pub mod winners;

pub use job_listings as job_listing_entity;
pub use monthly_draws as monthly_draw_entity;
pub use payments as payment_entity;
pub use registrations as registration_entity;
pub use winners as winner_entity;

pub use job_listings::JobType;
pub use monthly_draws::DrawStatus;
pub use payments::{PaymentStatus, PaymentType};
pub use registrations::{Language, MobileMoneyProvider, Region};
pub use winners::PrizeType;
