//! Paginated resource list controller for the admin management views.
//!
//! A [`services::controller::ListController`] owns the committed query of one
//! list view, dispatches one fetch per committed change and publishes the
//! render model through a `watch` channel.

pub mod domain;
pub mod dto;
pub mod error_conversions;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod services;

pub use services::controller::{ControllerSettings, ListController};
