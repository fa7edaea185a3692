pub mod app;
pub mod events;
pub mod panels;
pub mod session;
pub mod theme;
pub mod ui;
pub mod watch;
