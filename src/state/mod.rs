// State management module.
// Load states, routes and history, and the controller that drives them.

#![allow(dead_code)]

pub mod controller;
pub mod load;
pub mod navigation;

#[cfg(test)]
pub mod testing;

pub use controller::DocsController;
pub use load::{Failure, LoadState, LoadStatus, RetryAction, SiteView};
pub use navigation::{History, NavigateOptions, Navigator, Route};
