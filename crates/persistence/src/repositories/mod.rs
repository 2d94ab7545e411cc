pub mod activity;
pub mod activity_flow;
pub mod alert;
pub mod answer;
pub mod applet;
pub mod applet_access;
pub mod applet_history;
pub mod event;
pub mod invitation;
pub mod transfer;
pub mod user;

pub use activity::{ActivityItemWrite, ActivityRepository, ActivityWrite};
pub use activity_flow::{FlowRepository, FlowWrite};
pub use alert::{AlertRepository, AlertRow};
pub use answer::AnswerRepository;
pub use applet::{AppletRepository, AppletWrite};
pub use applet_access::AppletAccessRepository;
pub use applet_history::{AppletHistoryRepository, VersionRow};
pub use event::EventRepository;
pub use invitation::InvitationRepository;
pub use transfer::TransferRepository;
pub use user::UserRepository;
