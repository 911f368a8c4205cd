pub mod controller;
pub mod log;

pub use controller::{Controller, RecordRow, ViewModel, load_error_message};
