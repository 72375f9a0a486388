//! MongoDB-backed session store.
//!
//! One document per session in the `sessions` collection; turns are appended with
//! a single atomic `$push` so concurrent writers never split a turn.

use super::SessionStore;
use crate::models::{ChatMessage, SessionHistory, SessionRecord};
use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, to_bson},
    options::{IndexOptions, UpdateOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoSessionStore {
    client: MongoClient,
    db: Database,
}

impl MongoSessionStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        let session_id_index = IndexModel::builder()
            .keys(doc! { "session_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("session_id_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.sessions()
            .create_index(session_id_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create session_id index: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        let updated_at_index = IndexModel::builder()
            .keys(doc! { "updated_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("updated_at_idx".to_string())
                    .build(),
            )
            .build();

        self.sessions()
            .create_index(updated_at_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create updated_at index: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        tracing::info!("Session store indexes ready");
        Ok(())
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    fn sessions(&self) -> Collection<SessionRecord> {
        self.db.collection("sessions")
    }
}

#[async_trait]
impl SessionStore for MongoSessionStore {
    async fn get_history(&self, session_id: &str) -> Result<Option<SessionHistory>, AppError> {
        let record = self
            .sessions()
            .find_one(doc! { "session_id": session_id }, None)
            .await
            .map_err(|e| {
                tracing::error!(session_id = %session_id, "Failed to find session: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        Ok(record.map(SessionHistory::from))
    }

    async fn append_messages(
        &self,
        session_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<(), AppError> {
        let now = Utc::now().timestamp_millis();

        let messages = to_bson(&messages).map_err(|e| {
            tracing::error!("Failed to serialize messages: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;

        self.sessions()
            .update_one(
                doc! { "session_id": session_id },
                doc! {
                    "$push": { "messages": { "$each": messages } },
                    "$set": { "updated_at": now },
                    "$setOnInsert": { "created_at": now }
                },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await
            .map_err(|e| {
                tracing::error!(session_id = %session_id, "Failed to append messages: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }
}
