use crate::error::StorageError;
use serde::{Deserialize, Serialize};

pub trait Serializable: Serialize + for<'de> Deserialize<'de> {}

impl<T> Serializable for T where T: Serialize + for<'de> Deserialize<'de> {}

pub struct Serializer;

impl Serializer {
    pub fn to_json<T: Serializable>(value: &T) -> Result<String, StorageError> {
        serde_json::to_string(value).map_err(StorageError::Json)
    }

    pub fn from_json<T: Serializable>(json: &str) -> Result<T, StorageError> {
        serde_json::from_str(json).map_err(StorageError::Json)
    }

    pub fn to_json_pretty<T: Serializable>(value: &T) -> Result<String, StorageError> {
        serde_json::to_string_pretty(value).map_err(StorageError::Json)
    }
}
