pub mod access;
pub mod card_service;
pub mod collection_service;
pub mod demo_service;
pub mod user_service;

pub use access::Requester;
pub use card_service::CardService;
pub use collection_service::CollectionService;
pub use demo_service::{DemoReset, DemoService};
pub use user_service::{AccountRemoval, SignupResult, UserService};
