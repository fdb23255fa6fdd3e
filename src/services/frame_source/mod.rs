mod dry_capture;
mod frame_source;
mod r#trait;
#[cfg(feature = "screen-capture")]
mod xcap_capture;

pub use self::frame_source::{CaptureSnapshot, CaptureStats, CaptureTiming, FrameSource};
pub use self::r#trait::{create_capture_backend, CaptureBackend, CaptureHandle};
