pub mod card;
pub mod collection;
pub mod membership;
pub mod user;

pub use card::{CardPatch, NewCard, ScoredCard, TradingCard};
pub use collection::{CardCollection, CollectionWithOwner, ScoredCollection};
pub use membership::CollectionForCard;
pub use user::{NewUser, User};
