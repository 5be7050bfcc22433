//! Embassy async tasks
//!
//! The display task runs on core 0; everything else runs on core 1.

pub mod display;
pub mod net;
pub mod provisioning;
pub mod status;

pub use display::display_task;
pub use net::net_task;
pub use provisioning::{provisioning_task, AppResources};
