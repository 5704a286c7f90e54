//! Terminal front end for the location settings screen

mod console;

pub use console::Console;
