pub mod entity;
pub mod outcome;
pub mod page;
pub mod query;
pub mod resource;
pub mod types;
