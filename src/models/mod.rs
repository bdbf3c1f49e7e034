pub mod card;
pub mod profile;
pub mod session;

pub use card::{Card, Rank, Suit};
pub use profile::PlayerProfile;
pub use session::{GameMode, GameSession};
