pub mod cards;
pub mod extract;
pub mod prompt;
pub mod providers;
pub mod recommendations;
pub mod search;
pub mod session;
pub mod sessions;

pub use providers::{GeminiProvider, RecommendationProvider};
pub use sessions::SessionStore;
