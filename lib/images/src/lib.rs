//! Image storage for guild-gallery.
//!
//! Images are stored flat in a blob store. Every stored name starts with
//! the uploader's owner prefix (`{owner}-`), which is how listing per user
//! and ownership checks on delete work:
//!
//! ```
//! use guild_gallery_images::Owner;
//!
//! let owner = Owner::from_display_name("Ada  Lovelace");
//! assert_eq!(owner.as_str(), "Ada_Lovelace");
//! assert!(owner.owns("Ada_Lovelace-cat-01hx.png"));
//! assert!(!owner.owns("Grace-cat-01hx.png"));
//! ```

pub mod blob;
pub mod error;
pub mod gallery;
pub mod owner;
pub mod policy;
pub mod store;

pub use blob::{Blob, ImageUpload};
pub use error::{BlobError, GalleryError, UploadError};
pub use gallery::Gallery;
pub use owner::Owner;
pub use policy::UploadPolicy;
pub use store::{BlobStore, FsBlobStore};
