mod company;
mod contact;
mod deal;
mod follow_up;
mod interaction;
mod user;

pub use company::Company;
pub use contact::{contact_display_name, Contact, ContactStatus, EngagementStage};
pub use deal::{parse_amount, Deal, Stage};
pub use follow_up::{FollowUp, FollowUpStatus, SHEET_FALSE, SHEET_TRUE};
pub use interaction::{Direction, Interaction, InteractionType};
pub use user::{SchedulerLogEntry, User};
