pub mod record;

pub use record::{Record, sort_for_display};
