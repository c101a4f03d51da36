//! Commands Layer
//!
//! Command handlers that bridge the client to backend services. Each handler
//! resolves the caller's tenant before touching any repository.

mod common;
pub mod space_cmd;
pub mod list_cmd;
pub mod task_cmd;
pub mod onboarding_cmd;
pub mod dispatch;

pub use common::{IdArgs, NoArgs};
pub use space_cmd::*;
pub use list_cmd::*;
pub use task_cmd::*;
pub use onboarding_cmd::*;
pub use dispatch::{invoke, COMMAND_NAMES};
