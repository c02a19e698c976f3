//! Response contract: per-perspective results and the quorum verdict

pub mod entities;
pub mod status;

pub use entities::{
    CaaCheckDetails, CheckDetails, DcvCheckDetails, ErrorResponse, MpicResponse,
    PerspectiveResult,
};
pub use status::CheckStatus;
