pub mod app_search;
pub mod describe;
pub mod gemini;
pub mod traits;

pub use app_search::{parse_search_response, AppRecord, StoreAppsClient};
pub use describe::generate_description;
pub use gemini::GeminiClient;
pub use traits::{AppSearch, TextGenerator};
