//! Interactive terminal list built on ratatui.

pub mod app;
pub mod input;
pub mod view;

pub use app::{run, TuiOptions};
