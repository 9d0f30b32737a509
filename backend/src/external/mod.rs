//! External service integrations

pub mod object_storage;

pub use object_storage::{
    content_type_for, ObjectStorage, S3ObjectStorage, StorageError, StoredObject,
};
