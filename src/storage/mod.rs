//! Storage backends that live outside the relational database: the raw
//! medicine list and uploaded images.

/// Image backends (local disk, Cloudinary)
pub mod images;
/// Raw medicine list persistence
pub mod raw;

pub use images::{
    CloudinaryImageStore, ImageStore, ImageUpload, LocalImageStore, StoredImage,
};
pub use raw::{JsonFileRawStore, MemoryRawStore, RawBatch, RawMedicine, RawMedicineStore, RawStore};
