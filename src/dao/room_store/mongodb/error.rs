use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;
use uuid::Uuid;

pub(super) type MongoResult<T> = Result<T, MongoDaoError>;

/// Errors raised by the MongoDB room store.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        #[source]
        /// Driver-level cause.
        source: MongoError,
    },
    /// The driver rejected the client options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        /// Driver-level cause.
        source: MongoError,
    },
    /// The database never answered the connection ping.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Number of pings attempted before giving up.
        attempts: u32,
        #[source]
        /// Driver-level cause.
        source: MongoError,
    },
    /// A routine health-check ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        /// Driver-level cause.
        source: MongoError,
    },
    /// Index creation failed at startup.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection carrying the index.
        collection: &'static str,
        /// Index key description.
        index: &'static str,
        #[source]
        /// Driver-level cause.
        source: MongoError,
    },
    /// Insert of a new room failed.
    #[error("failed to create room `{room_number}`")]
    CreateRoom {
        /// Human-entered number of the room being created.
        room_number: String,
        #[source]
        /// Driver-level cause.
        source: MongoError,
    },
    /// Write-back of a room record failed.
    #[error("failed to save room `{id}`")]
    SaveRoom {
        /// Store id of the room.
        id: Uuid,
        #[source]
        /// Driver-level cause.
        source: MongoError,
    },
    /// Lookup by room id failed.
    #[error("failed to load room `{id}`")]
    LoadRoom {
        /// Store id of the room.
        id: Uuid,
        #[source]
        /// Driver-level cause.
        source: MongoError,
    },
    /// Lookup by room number failed.
    #[error("failed to look up room number `{room_number}`")]
    FindRoom {
        /// Human-entered number queried.
        room_number: String,
        #[source]
        /// Driver-level cause.
        source: MongoError,
    },
    /// Listing room numbers failed.
    #[error("failed to list rooms")]
    ListRooms {
        #[source]
        /// Driver-level cause.
        source: MongoError,
    },
}

impl MongoDaoError {
    /// True when the underlying driver error is a duplicate-key write, i.e.
    /// the unique room-number index rejected a create.
    pub fn is_duplicate_key(&self) -> bool {
        let MongoDaoError::CreateRoom { source, .. } = self else {
            return false;
        };
        match source.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
            _ => false,
        }
    }
}
