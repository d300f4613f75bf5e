mod invitation;
mod permission;
mod role;
mod tenant;
mod user;

pub use invitation::{Invitation, InviteSummary};
pub use permission::Permission;
pub use role::{Role, RoleWithPermissions};
pub use tenant::Tenant;
pub use user::User;
