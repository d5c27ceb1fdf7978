// Application layer - account rules and transfer orchestration.
// Clients (the interactive menu, one-shot subcommands) only talk to
// TransferService; the repository stays behind it.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
