//! Business logic services.

pub mod answer;
pub mod applet;
pub mod invitation;
pub mod transfer;

pub use answer::AnswerService;
pub use applet::AppletService;
pub use invitation::InvitationService;
pub use transfer::TransferService;
