//! Model Adapters.
//!
//! Implementations of the model ports plus the tiered gateway.
//!
//! ## Available Adapters
//!
//! - `GeminiProvider` - One Gemini model tier over REST
//! - `GeminiMediaStore` - Gemini file API uploads
//! - `TieredGateway` - Fast/capable pair with retry and fallback
//! - `MockModelProvider` / `MockMediaStore` - Configurable mocks for testing

mod gemini_media;
mod gemini_provider;
mod mock_provider;
mod retry;
mod tiered_gateway;

pub use gemini_media::GeminiMediaStore;
pub use gemini_provider::{GeminiConfig, GeminiProvider};
pub use mock_provider::{MockMediaStore, MockModelProvider};
pub use retry::{FailoverPlan, RetryPolicy, Step, Tier};
pub use tiered_gateway::{ModelUnavailable, TieredGateway};
