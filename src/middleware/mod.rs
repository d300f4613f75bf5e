pub mod audit;
pub mod rbac;
