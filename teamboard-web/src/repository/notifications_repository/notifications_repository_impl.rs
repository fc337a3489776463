use super::{
    entity::{NotificationFindEntity, NotificationInsertEntity},
    Notification, NotificationInsert, NotificationsRepository,
};
use crate::repository::Error;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use futures::TryStreamExt;
use mongodb::{error::ErrorKind, options::IndexOptions, Collection, Database, IndexModel};
use std::sync::Arc;
use time::OffsetDateTime;

const NOTIFICATIONS: &str = "notifications";
const INDEX_NAME_USER_ID_CREATED_AT: &str = "index_user_id_created_at";

pub struct NotificationsRepositoryImpl {
    database: Database,
}

impl NotificationsRepositoryImpl {
    pub async fn new(database: Database) -> Result<Self, mongodb::error::Error> {
        let collection = database.collection::<Document>(NOTIFICATIONS);
        let index_names = match collection.list_index_names().await {
            Ok(index_names) => index_names,
            // Collection does not exist yet
            Err(_) => Vec::new(),
        };

        if !index_names.contains(&INDEX_NAME_USER_ID_CREATED_AT.to_string()) {
            Self::create_user_id_created_at_index(&collection).await?;
            tracing::debug!("created index {NOTIFICATIONS}.{INDEX_NAME_USER_ID_CREATED_AT}");
        }

        Ok(Self { database })
    }

    async fn create_user_id_created_at_index(
        collection: &Collection<Document>,
    ) -> Result<(), mongodb::error::Error> {
        let index = IndexModel::builder()
            .keys(doc! {
                "user_id": 1,
                "created_at": -1,
            })
            .options(
                IndexOptions::builder()
                    .name(INDEX_NAME_USER_ID_CREATED_AT.to_string())
                    .build(),
            )
            .build();

        collection.create_index(index).await?;

        Ok(())
    }

    ///
    /// Best effort, an error leaves the batch in the collection
    ///
    async fn rollback_batch(&self, batch_id: ObjectId) {
        let result = self
            .database
            .collection::<Document>(NOTIFICATIONS)
            .delete_many(doc! { "batch_id": batch_id })
            .await;

        match result {
            Ok(delete_result) => tracing::warn!(
                %batch_id,
                deleted = delete_result.deleted_count,
                "rolled back partially inserted notifications"
            ),
            Err(err) => tracing::error!(
                %batch_id,
                %err,
                "failed to roll back notifications, partial batch left in collection"
            ),
        }
    }
}

#[async_trait]
impl NotificationsRepository for NotificationsRepositoryImpl {
    async fn insert_many(
        &self,
        notifications: Vec<NotificationInsert>,
    ) -> Result<Vec<Notification>, Error> {
        if notifications.is_empty() {
            return Ok(Vec::new());
        }

        let batch_id = ObjectId::new();
        let created_at = DateTime::from(OffsetDateTime::now_utc());
        let entities = notifications
            .into_iter()
            .map(|notification| NotificationInsertEntity {
                user_id: notification.user_id,
                title: notification.title,
                content: notification.content,
                is_read: false,
                created_at,
                batch_id,
            })
            .collect::<Vec<_>>();

        let insert_result = match self
            .database
            .collection::<NotificationInsertEntity>(NOTIFICATIONS)
            .insert_many(&entities)
            .await
        {
            Ok(insert_result) => insert_result,
            Err(err) => {
                self.rollback_batch(batch_id).await;
                return Err(Error::Mongo(err));
            }
        };

        let mut inserted = Vec::with_capacity(entities.len());
        for (index, entity) in entities.into_iter().enumerate() {
            let Some(Bson::ObjectId(id)) = insert_result.inserted_ids.get(&index) else {
                tracing::error!("invalid type of inserted '_id'");
                self.rollback_batch(batch_id).await;
                return Err(Error::Mongo(
                    ErrorKind::Custom(Arc::new("invalid type of inserted '_id'")).into(),
                ));
            };

            inserted.push(Notification {
                id: *id,
                user_id: entity.user_id,
                title: entity.title,
                content: entity.content,
                is_read: entity.is_read,
                created_at: entity.created_at.to_time_0_3(),
            });
        }

        Ok(inserted)
    }

    async fn find_many(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Notification>, u64), Error> {
        let collection = self
            .database
            .collection::<NotificationFindEntity>(NOTIFICATIONS);

        let total = collection
            .count_documents(doc! { "user_id": user_id })
            .await?;

        let notifications = collection
            .find(doc! { "user_id": user_id })
            .sort(doc! {
                "created_at": -1,
                "_id": -1,
            })
            .skip(offset.max(0) as u64)
            .limit(limit)
            .await?
            .try_collect::<Vec<_>>()
            .await?
            .into_iter()
            .map(Notification::from)
            .collect();

        Ok((notifications, total))
    }

    async fn count_unread(&self, user_id: i64) -> Result<u64, Error> {
        let count = self
            .database
            .collection::<Document>(NOTIFICATIONS)
            .count_documents(doc! {
                "user_id": user_id,
                "is_read": false,
            })
            .await?;

        Ok(count)
    }

    async fn update_read(&self, id: ObjectId, user_id: i64) -> Result<(), Error> {
        let update_result = self
            .database
            .collection::<Document>(NOTIFICATIONS)
            .update_one(
                doc! {
                    "_id": id,
                    "user_id": user_id,
                },
                doc! {
                    "$set": {
                        "is_read": true,
                    }
                },
            )
            .await?;

        // matched_count because setting true over true is not a modification
        match update_result.matched_count == 1 {
            true => Ok(()),
            false => Err(Error::NoDocumentUpdated),
        }
    }

    async fn update_all_read(&self, user_id: i64) -> Result<u64, Error> {
        let update_result = self
            .database
            .collection::<Document>(NOTIFICATIONS)
            .update_many(
                doc! {
                    "user_id": user_id,
                    "is_read": false,
                },
                doc! {
                    "$set": {
                        "is_read": true,
                    }
                },
            )
            .await?;

        Ok(update_result.modified_count)
    }

    async fn delete(&self, id: ObjectId, user_id: i64) -> Result<(), Error> {
        let delete_result = self
            .database
            .collection::<Document>(NOTIFICATIONS)
            .delete_one(doc! {
                "_id": id,
                "user_id": user_id,
            })
            .await?;

        match delete_result.deleted_count == 1 {
            true => Ok(()),
            false => Err(Error::NoDocumentUpdated),
        }
    }
}
