pub mod home;
pub mod viewer;

pub use home::{HomeAction, HomeState, show_home};
pub use viewer::{ViewerState, show_viewer};
