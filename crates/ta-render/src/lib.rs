/// Terminal output for termascii.
///
/// Provides the raw escape-sequence screen controller and layout helpers.
pub mod layout;
pub mod screen;

pub use screen::{AnsiScreen, DEFAULT_SIZE, Screen, query_size};
