use sqlx::SqliteConnection;

use crate::traits::{NewNotification, NotificationError};

pub async fn insert_notification(
    notification: NewNotification,
    conn: &mut SqliteConnection,
) -> Result<(), NotificationError> {
    let related = serde_json::to_string(&notification.related_data).map_err(|e| NotificationError(e.to_string()))?;
    sqlx::query(
        r#"
            INSERT INTO notifications (recipient, actor, kind, title, message, order_id, related_data)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(notification.recipient)
    .bind(notification.actor)
    .bind(notification.kind)
    .bind(notification.title)
    .bind(notification.message)
    .bind(notification.order_id.as_str().to_string())
    .bind(related)
    .execute(conn)
    .await
    .map_err(|e| NotificationError(e.to_string()))?;
    Ok(())
}
