pub mod csv_codec;
pub mod photos_repo;
pub mod students_repo;

pub use photos_repo::{PhotoKind, PhotoStore};
pub use students_repo::RecordStore;
