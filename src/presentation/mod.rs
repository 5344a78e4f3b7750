pub mod app;
pub mod forms;
pub mod router;
pub mod views;

pub use app::{AppShell, Screen};
pub use router::{RouteState, RouteTicket, Router, View};
