pub mod image_loader;
pub mod toml_loader;

pub use image_loader::{
    detect_image_mime, load_image, load_image_folder, load_images, IngestReport, LoadedImage,
    RejectedFile,
};
pub use toml_loader::load_toml;
