pub mod authorize;
pub mod bootstrap;
pub mod catalog;
pub mod seed;

pub use authorize::{Actor, Decision};
pub use catalog::{Action, PermissionCode, Resource};
