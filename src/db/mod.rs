pub mod audit;
pub mod invitations;
pub mod permissions;
pub mod roles;
pub mod tenants;
pub mod users;
