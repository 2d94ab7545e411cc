pub mod activity;
pub mod activity_flow;
pub mod alert;
pub mod answer;
pub mod applet;
pub mod applet_access;
pub mod event;
pub mod invitation;
pub mod transfer;
pub mod user;

pub use activity::{ActivityEntity, ActivityItemEntity};
pub use activity_flow::{FlowEntity, FlowItemEntity};
pub use alert::AlertEntity;
pub use answer::AnswerEntity;
pub use applet::{decode_language_map, AppletEntity, AppletHistoryEntity};
pub use applet_access::AppletAccessEntity;
pub use event::EventEntity;
pub use invitation::InvitationEntity;
pub use transfer::TransferEntity;
pub use user::UserEntity;
