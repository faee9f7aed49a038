//! Embassy async tasks
//!
//! Each task runs independently and posts into the event queue.

pub mod buttons;
pub mod net;

pub use buttons::button_task;
pub use net::net_task;
