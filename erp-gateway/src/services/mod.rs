pub mod backend_client;
pub mod category_tree;
pub mod collation;
pub mod permission_cache;
pub mod permissions;
pub mod token_broker;

pub use backend_client::BackendClient;
pub use permission_cache::PermissionCache;
pub use permissions::{PermissionResolver, PermissionService};
pub use token_broker::TokenBroker;
