use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

/// Parsed connection settings for the MongoDB backend.
#[derive(Clone)]
pub struct MongoConfig {
    pub(super) options: ClientOptions,
    pub(super) database_name: String,
}

impl MongoConfig {
    /// Parse a MongoDB URI, defaulting the database name when none is given.
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let database_name = db_name.unwrap_or("cardroom").to_owned();
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|source| MongoDaoError::InvalidUri {
                uri: uri.to_owned(),
                source,
            })?;

        Ok(Self {
            options,
            database_name,
        })
    }
}
