pub mod frame;
pub mod keyboard;
pub mod trigger;

pub use frame::{CaptureRegion, Frame};
pub use keyboard::{KeyCode, KeyState, VirtualKeyEvent};
pub use trigger::TriggerEvent;
