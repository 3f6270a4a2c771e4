pub mod catalog;
pub mod loaders;
pub mod mode;
pub mod package;
pub mod payload;
pub mod queue_item;

pub use catalog::{option_for, UpscaleOption, UpscaleResolution, UPSCALE_OPTIONS};
pub use loaders::{load_image, load_image_folder, load_images, load_toml, IngestReport, LoadedImage};
pub use mode::UpscaleMode;
pub use package::{find_package, CreditPackage, CREDIT_PACKAGES};
pub use payload::ImagePayload;
pub use queue_item::{ItemId, ItemState, ItemStatus, QueueItem, DEFAULT_ERROR_MESSAGE, INTERRUPTED_MESSAGE};
