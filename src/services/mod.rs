pub mod credential_gate;
pub mod download_writer;
pub mod purchase_service;
pub mod upscale_service;

pub use credential_gate::{CredentialGate, StdinCredentialGate};
pub use download_writer::DownloadWriter;
pub use purchase_service::PurchaseService;
pub use upscale_service::{GeminiUpscaler, Upscaler};
