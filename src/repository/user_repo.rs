use crate::config::mongo_conf::MongoConfig;
use crate::model::user::{NewUser, User};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::service::user_query::UserFilter;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::{options::FindOptions, Client, Collection};
use tracing::{debug, info};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: NewUser) -> RepositoryResult<User>;
    async fn find(&self, filter: &UserFilter, skip: u64, limit: u64) -> RepositoryResult<Vec<User>>;
    async fn count(&self, filter: &UserFilter) -> RepositoryResult<u64>;
}

/// Builds the MongoDB filter document for a [`UserFilter`].
///
/// The username is escaped before being used as a `$regex`, so it is always a
/// literal case-insensitive substring match.
pub fn filter_document(filter: &UserFilter) -> Document {
    let mut query = Document::new();
    if let Some(ref username) = filter.username {
        query.insert(
            "username",
            doc! { "$regex": regex::escape(username), "$options": "i" },
        );
    }
    if let Some(ref role) = filter.role {
        query.insert("role", role.as_str());
    }
    query
}

/// Find options for a `skip`/`limit` window. The driver sends both as
/// signed 64-bit integers, so a skip beyond `i64::MAX` yields `None`: no
/// document can sit at that offset.
pub fn find_options(skip: u64, limit: u64) -> Option<FindOptions> {
    i64::try_from(skip).ok()?;
    Some(
        FindOptions::builder()
            .skip(skip)
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .build(),
    )
}

pub struct MongoUserRepository {
    client: Client,
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        use mongodb::options::{ClientOptions, Credential, ResolverConfig};

        let mut client_options =
            ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
        client_options.app_name = Some("RosterBackend".to_string());
        client_options.max_pool_size = Some(config.pool_size);
        client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));
        if let (Some(ref username), Some(ref password)) = (&config.username, &config.password) {
            client_options.credential = Some(
                Credential::builder()
                    .username(username.clone())
                    .password(password.clone())
                    .build(),
            );
        }

        let database = config.resolve_database(client_options.default_database.as_deref());
        debug!(database = %database, collection = %config.user_collection, "Using MongoDB namespace");

        let client = Client::with_options(client_options)?;
        let collection = client
            .database(&database)
            .collection::<User>(&config.user_collection);
        Ok(MongoUserRepository { client, collection })
    }

    /// Handle to the underlying client, for callers that own the connection
    /// lifecycle (e.g. to call `shutdown` once a batch is done).
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn collection(&self) -> &Collection<User> {
        &self.collection
    }

    /// Round-trips a `ping` command to check the deployment is reachable.
    pub async fn ping(&self) -> RepositoryResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[tracing::instrument(skip(self, user), fields(username = %user.username()))]
    async fn insert(&self, user: NewUser) -> RepositoryResult<User> {
        let user = user.into_user(ObjectId::new());
        self.collection.insert_one(&user, None).await?;
        debug!("User inserted");
        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(skip = skip, limit = limit))]
    async fn find(&self, filter: &UserFilter, skip: u64, limit: u64) -> RepositoryResult<Vec<User>> {
        let Some(options) = find_options(skip, limit) else {
            debug!("Window starts past the last addressable offset");
            return Ok(Vec::new());
        };
        let cursor = self.collection.find(filter_document(filter), options).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        info!("Fetched {} users", users.len());
        Ok(users)
    }

    #[tracing::instrument(skip(self))]
    async fn count(&self, filter: &UserFilter) -> RepositoryResult<u64> {
        let count = self
            .collection
            .count_documents(filter_document(filter), None)
            .await?;
        debug!("Matching users count: {}", count);
        Ok(count)
    }
}

/// Stand-in used when no MongoDB client could be built at startup. The
/// server keeps running and every storage call fails with the original cause.
pub struct UnavailableUserRepository {
    reason: String,
}

impl UnavailableUserRepository {
    pub fn new<T: Into<String>>(reason: T) -> Self {
        UnavailableUserRepository { reason: reason.into() }
    }

    fn error(&self) -> RepositoryError {
        RepositoryError::connection(format!("database unavailable: {}", self.reason))
    }
}

#[async_trait]
impl UserRepository for UnavailableUserRepository {
    async fn insert(&self, _user: NewUser) -> RepositoryResult<User> {
        Err(self.error())
    }

    async fn find(&self, _filter: &UserFilter, _skip: u64, _limit: u64) -> RepositoryResult<Vec<User>> {
        Err(self.error())
    }

    async fn count(&self, _filter: &UserFilter) -> RepositoryResult<u64> {
        Err(self.error())
    }
}
