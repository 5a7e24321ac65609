pub mod app_settings;
pub mod app_state;
pub mod form;
pub mod messages;
pub mod network;
pub mod reconcile;
pub mod refresher;
pub mod session;
