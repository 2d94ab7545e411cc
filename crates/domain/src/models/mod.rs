pub mod activity;
pub mod activity_flow;
pub mod alert;
pub mod answer;
pub mod applet;
pub mod applet_access;
pub mod invitation;
pub mod language;
pub mod role;
pub mod transfer;

pub use activity::{
    ActivityCreate, ActivityFull, ActivityItemCreate, ActivityItemFull, ActivityItemResponse,
    ActivityItemUpdate, ActivityResponse, ActivityUpdate,
};
pub use activity_flow::{
    FlowCreate, FlowFull, FlowItemCreate, FlowItemFull, FlowItemUpdate, FlowResponse, FlowUpdate,
};
pub use alert::AlertResponse;
pub use answer::{Answer, AnswerAlert, SubmitAnswerRequest};
pub use applet::{
    AppletDetailResponse, AppletFull, AppletLinkResponse, AppletNameRequest, AppletNameResponse,
    AppletResponse, CreateAccessLinkRequest, CreateAppletRequest, DuplicateAppletRequest,
    Encryption, ReportConfiguration, RetentionRequest, RetentionType,
    SetReportConfigurationRequest, UpdateAppletRequest,
};
pub use applet_access::{AccessMeta, AppletAccess};
pub use invitation::{
    InvitationResponse, InvitationStatus, InviteManagersRequest, InviteRespondentRequest,
    InviteReviewerRequest,
};
pub use language::LanguageMap;
pub use role::{Role, UnknownRole, UNKNOWN_ROLE_PRIORITY};
pub use transfer::{InitiateTransferRequest, TransferResponse};
