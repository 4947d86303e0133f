//! Domain logic - pure release rules independent of git and HTTP

pub mod prerelease;
pub mod release;
pub mod request;
pub mod version;

pub use release::{ReleaseChannel, ReleaseId, ReleaseKind, ReleaseRecord};
pub use request::{PromotionOutcome, PromotionRequest, VersionPlan};
pub use version::Version;
