use common::media::{ContentHash, decode_data_uri};
use common::{DecodedImage, MediaKey, MediaStore};
use sea_orm::*;

use crate::entity::{recipe, user};
use crate::error::AppError;

/// Public URL of a stored image.
pub fn media_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}

/// Decode an inline `data:` image, reporting failures against `field`.
pub fn decode_image(data_uri: &str, field: &'static str) -> Result<DecodedImage, AppError> {
    decode_data_uri(data_uri).map_err(|e| AppError::field(field, e.to_string()))
}

/// Serialize every writer and releaser of `key` until the surrounding
/// transaction ends.
pub async fn lock_media_key<C: ConnectionTrait>(conn: &C, key: &str) -> Result<(), DbErr> {
    conn.execute_raw(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock(hashtext($1))",
        [key.into()],
    ))
    .await?;
    Ok(())
}

/// Persist `image` for rows the transaction is about to write, returning
/// the media key.
///
/// The write happens under the key lock, so a concurrent release either
/// finishes first (and the file is written again here) or waits for this
/// transaction and then sees the new reference.
pub async fn attach_image(
    txn: &DatabaseTransaction,
    store: &dyn MediaStore,
    image: &DecodedImage,
) -> Result<String, AppError> {
    let key = MediaKey {
        hash: ContentHash::compute(&image.bytes),
        format: image.format,
    }
    .to_string();
    lock_media_key(txn, &key).await?;
    store.put(image).await?;
    Ok(key)
}

/// Commit `txn` when `outcome` succeeded. Otherwise roll back, and in any
/// failure release the image the transaction attached.
pub async fn finish_with_image<T>(
    txn: DatabaseTransaction,
    outcome: Result<T, AppError>,
    db: &DatabaseConnection,
    store: &dyn MediaStore,
    attached: Option<&str>,
) -> Result<T, AppError> {
    let result = match outcome {
        Ok(value) => txn.commit().await.map(|()| value).map_err(AppError::from),
        Err(e) => {
            if let Err(rb) = txn.rollback().await {
                tracing::warn!("Rollback failed: {rb}");
            }
            Err(e)
        }
    };

    if result.is_err()
        && let Some(key) = attached
        && let Err(e) = release_image(db, store, key).await
    {
        tracing::warn!(key, "Failed to release abandoned media: {e:?}");
    }
    result
}

/// Delete a stored image once no avatar or recipe refers to it.
///
/// Call after the transaction that dropped the reference has committed.
pub async fn release_image(
    db: &DatabaseConnection,
    store: &dyn MediaStore,
    key: &str,
) -> Result<(), AppError> {
    let parsed: MediaKey = match key.parse() {
        Ok(k) => k,
        Err(e) => {
            tracing::warn!(key, "Skipping release of unparsable media key: {e}");
            return Ok(());
        }
    };

    let txn = db.begin().await?;
    lock_media_key(&txn, key).await?;

    let avatar_refs = user::Entity::find()
        .filter(user::Column::Avatar.eq(key))
        .count(&txn)
        .await?;
    let recipe_refs = recipe::Entity::find()
        .filter(recipe::Column::Image.eq(key))
        .count(&txn)
        .await?;
    if avatar_refs + recipe_refs == 0
        && let Err(e) = store.delete(&parsed).await
    {
        tracing::warn!(key, "Failed to delete unreferenced media: {e}");
    }

    txn.commit().await?;
    Ok(())
}
