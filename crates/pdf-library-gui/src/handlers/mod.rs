pub mod library;
pub mod viewer;
