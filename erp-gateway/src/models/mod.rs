pub mod access;
pub mod category;
pub mod token;
pub mod user;

pub use access::{CachedAuth, Profile, Role};
pub use category::{CategoryNode, FlatCategory, FlatNode};
pub use token::StoredToken;
pub use user::GatewayUser;
