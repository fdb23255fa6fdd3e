pub mod action_channel;
pub mod color_detector;
pub mod detection_loop;
pub mod frame_slot;
pub mod frame_source;
pub mod injection_worker;
pub mod orchestrator;
pub mod trigger_monitor;
pub mod virtual_device;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::{Backends, Orchestrator};
pub use virtual_device::VirtualDevice;
