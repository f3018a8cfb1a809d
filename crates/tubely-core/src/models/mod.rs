pub mod media;
pub mod video;

pub use media::{MediaClass, MediaType, UploadStage};
pub use video::Video;
