pub mod boundary;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod git;
pub mod github;
pub mod guard;
pub mod logging;
pub mod promoter;
pub mod publisher;
pub mod resolver;
pub mod ui;

pub use error::{PromoteError, PromotionFailure, PromotionStage, Result};
