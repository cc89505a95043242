pub mod event;
pub mod ticket;

pub use event::{EventStatus, MarathonEvent};
pub use ticket::{PricingRule, TicketType, VisibilityRules};
