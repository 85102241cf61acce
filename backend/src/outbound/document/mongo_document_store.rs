//! `DocumentStore` implementation over the official MongoDB driver.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::{Client, Collection, Database};
use tracing::info;

use crate::domain::ports::{DocumentStore, DocumentStoreError, SourceBatch};
use crate::domain::{Product, User};

use super::documents::{
    NewProductDocument, NewUserDocument, decode_product, decode_user, encode,
};

const USERS: &str = "users";
const PRODUCTS: &str = "products";

fn map_mongo_error(error: MongoError) -> DocumentStoreError {
    let message = error.to_string();
    match *error.kind {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::Authentication { .. }
        | ErrorKind::InvalidArgument { .. } => DocumentStoreError::connection(message),
        ErrorKind::BsonDeserialization(_) => DocumentStoreError::decode(message),
        _ => DocumentStoreError::query(message),
    }
}

/// Document store backed by a pooled MongoDB client.
#[derive(Clone)]
pub struct MongoDocumentStore {
    client: Client,
    database: Database,
}

impl MongoDocumentStore {
    /// Connect to `uri`, select `database` and ping the server.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Connection`] when the URI is invalid or
    /// no server answers the ping.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, DocumentStoreError> {
        let client = Client::with_uri_str(uri).await.map_err(map_mongo_error)?;
        let database = client.database(database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|err| DocumentStoreError::connection(err.to_string()))?;
        info!(database = database.name(), "connected to document store");
        Ok(Self { client, database })
    }

    /// Close the client's connections, waiting for in-flight operations.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<(), DocumentStoreError> {
        self.collection(collection)
            .insert_one(document)
            .await
            .map(|_| ())
            .map_err(map_mongo_error)
    }

    async fn read_all(&self, collection: &str) -> Result<Vec<Document>, DocumentStoreError> {
        let cursor = self
            .collection(collection)
            .find(doc! {})
            .await
            .map_err(map_mongo_error)?;
        cursor.try_collect::<Vec<Document>>().await.map_err(map_mongo_error)
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn insert_user(&self, user: &User) -> Result<(), DocumentStoreError> {
        let document = encode(&NewUserDocument::from(user))?;
        self.insert(USERS, document).await
    }

    async fn insert_product(&self, product: &Product) -> Result<(), DocumentStoreError> {
        let document = encode(&NewProductDocument::from(product))?;
        self.insert(PRODUCTS, document).await
    }

    async fn list_users(&self) -> Result<SourceBatch<User>, DocumentStoreError> {
        let documents = self.read_all(USERS).await?;
        Ok(documents.into_iter().map(decode_user).collect())
    }

    async fn list_products(&self) -> Result<SourceBatch<Product>, DocumentStoreError> {
        let documents = self.read_all(PRODUCTS).await?;
        Ok(documents.into_iter().map(decode_product).collect())
    }
}
