pub mod key_names;

pub use key_names::{KeyNames, FIRST_BUTTON_CODE, MAX_KEY_CODE};
