pub mod brands;
pub mod catalog;
pub mod images;
pub mod setup;
pub mod ui;
