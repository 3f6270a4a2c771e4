pub mod credentials;
pub mod gemini_client;

pub use credentials::CredentialStore;
pub use gemini_client::GeminiClient;
