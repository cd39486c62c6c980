//! Navigation: the known pages and the capability used to move between them.

pub mod navigator;
pub mod route;

pub use navigator::{HistoryNavigator, NavEvent, Navigator};
pub use route::{ResolvedRoute, RouteName, RouteTable};
