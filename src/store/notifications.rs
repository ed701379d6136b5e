use crate::{
    error::AppError,
    model::notification::{NewNotification, Notification},
    store::{next_id, storage::Storage},
};
use chrono::Utc;
use futures::lock::Mutex;
use std::sync::Arc;

pub const NOTIFICATIONS: &str = "notifications";

/// Append-only notification list. Only the read flag ever changes.
pub struct NotificationSink {
    storage: Arc<Storage>,
    write_lock: Mutex<()>,
}

impl NotificationSink {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn notify(&self, new: NewNotification) -> Result<Notification, AppError> {
        let mut created = self.notify_all(vec![new]).await?;
        created
            .pop()
            .ok_or_else(|| AppError::Internal("notification was not appended".into()))
    }

    /// Appends several notifications with a single write.
    pub async fn notify_all(&self, batch: Vec<NewNotification>) -> Result<Vec<Notification>, AppError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let _guard = self.write_lock.lock().await;
        let mut all: Vec<Notification> = self.storage.load(NOTIFICATIONS).await?;
        let mut id = next_id(all.iter().map(|n| n.id));
        let now = Utc::now();

        let created: Vec<Notification> = batch
            .into_iter()
            .map(|new| {
                let notification = Notification {
                    id,
                    user_id: new.user_id,
                    title: new.title,
                    message: new.message,
                    severity: new.severity,
                    read: false,
                    created_at: now,
                    related_application_id: new.related_application_id,
                };
                id += 1;
                notification
            })
            .collect();

        all.extend(created.iter().cloned());
        self.storage.save(NOTIFICATIONS, &all).await?;
        Ok(created)
    }

    /// Notifications visible to `audiences`, newest first.
    pub async fn for_user(&self, audiences: &[String]) -> Result<Vec<Notification>, AppError> {
        let all: Vec<Notification> = self.storage.load(NOTIFICATIONS).await?;
        let mut visible: Vec<Notification> =
            all.into_iter().filter(|n| n.is_for(audiences)).collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(visible)
    }

    pub async fn unread_count(&self, audiences: &[String]) -> Result<usize, AppError> {
        let visible = self.for_user(audiences).await?;
        Ok(visible.iter().filter(|n| !n.read).count())
    }

    /// Marks one notification read. Notifications outside `audiences`
    /// are reported as missing.
    pub async fn mark_read(&self, id: u64, audiences: &[String]) -> Result<Notification, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut all: Vec<Notification> = self.storage.load(NOTIFICATIONS).await?;

        let notification = all
            .iter_mut()
            .find(|n| n.id == id && n.is_for(audiences))
            .ok_or_else(|| AppError::NotFound(format!("Notification {id}")))?;
        notification.read = true;
        let updated = notification.clone();

        self.storage.save(NOTIFICATIONS, &all).await?;
        Ok(updated)
    }

    /// Returns how many notifications flipped to read.
    pub async fn mark_all_read(&self, audiences: &[String]) -> Result<usize, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut all: Vec<Notification> = self.storage.load(NOTIFICATIONS).await?;

        let mut changed = 0;
        for n in all.iter_mut().filter(|n| !n.read && n.is_for(audiences)) {
            n.read = true;
            changed += 1;
        }

        if changed > 0 {
            self.storage.save(NOTIFICATIONS, &all).await?;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        notification::{AUDIENCE_ALL, Severity, audiences_for},
        role::Role,
    };

    fn message(user_id: &str, title: &str) -> NewNotification {
        NewNotification {
            user_id: user_id.into(),
            title: title.into(),
            message: "body".into(),
            severity: Severity::Info,
            related_application_id: None,
        }
    }

    fn sink() -> NotificationSink {
        NotificationSink::new(Arc::new(Storage::memory()))
    }

    #[actix_web::test]
    async fn ids_increase_and_newest_comes_first() {
        let sink = sink();
        let first = sink.notify(message("3", "first")).await.unwrap();
        let second = sink.notify(message("3", "second")).await.unwrap();
        assert!(second.id > first.id);

        let visible = sink.for_user(&audiences_for(3, Role::Employee)).await.unwrap();
        let titles: Vec<_> = visible.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["second", "first"]);
    }

    #[actix_web::test]
    async fn users_see_their_own_role_and_broadcast_messages() {
        let sink = sink();
        sink.notify_all(vec![
            message("3", "mine"),
            message("4", "someone else"),
            message("manager", "managers"),
            message(AUDIENCE_ALL, "everyone"),
        ])
        .await
        .unwrap();

        let employee = sink.for_user(&audiences_for(3, Role::Employee)).await.unwrap();
        assert_eq!(employee.len(), 2);

        let manager = sink.for_user(&audiences_for(2, Role::Manager)).await.unwrap();
        assert_eq!(manager.len(), 2);
        assert!(manager.iter().any(|n| n.title == "managers"));
    }

    #[actix_web::test]
    async fn mark_read_is_scoped_to_the_reader() {
        let sink = sink();
        let other = sink.notify(message("4", "not yours")).await.unwrap();
        let mine = sink.notify(message("3", "yours")).await.unwrap();
        let audiences = audiences_for(3, Role::Employee);

        assert!(matches!(
            sink.mark_read(other.id, &audiences).await,
            Err(AppError::NotFound(_))
        ));
        assert!(sink.mark_read(mine.id, &audiences).await.unwrap().read);
        assert_eq!(sink.unread_count(&audiences).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn mark_all_read_counts_only_unread_messages() {
        let sink = sink();
        sink.notify_all(vec![message("3", "a"), message("3", "b"), message("4", "c")])
            .await
            .unwrap();
        let audiences = audiences_for(3, Role::Employee);

        assert_eq!(sink.mark_all_read(&audiences).await.unwrap(), 2);
        assert_eq!(sink.mark_all_read(&audiences).await.unwrap(), 0);
        assert_eq!(
            sink.unread_count(&audiences_for(4, Role::Employee)).await.unwrap(),
            1
        );
    }
}
