pub mod access;
pub mod app;
pub mod categories;
