//! Notification center: a capped, newest-first list with read state.
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{keys, LocalStore, StoreError};

/// Maximum number of notifications kept; the oldest are evicted.
pub const MAX_NOTIFICATIONS: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Notifications {
    entries: Vec<Notification>,
    last_id: i64,
}

impl Notifications {
    /// Load the list from the store, seeding the defaults on first run.
    pub async fn load(store: &LocalStore, now: DateTime<Utc>) -> Result<Self, StoreError> {
        let entries = match store.get_json::<Vec<Notification>>(keys::NOTIFICATIONS).await? {
            Some(entries) => entries,
            None => {
                tracing::info!("Seeding default notifications");
                Self::defaults(now)
            }
        };
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(mut entries: Vec<Notification>) -> Self {
        entries.truncate(MAX_NOTIFICATIONS);
        let last_id = entries.iter().map(|n| n.id).max().unwrap_or(0);
        Self { entries, last_id }
    }

    /// The two notifications a fresh install starts with.
    pub fn defaults(now: DateTime<Utc>) -> Vec<Notification> {
        vec![
            Notification {
                id: 1,
                kind: NotificationKind::Info,
                title: "Welcome to FoxWeb".to_string(),
                message: "Thanks for using our download center.".to_string(),
                created_at: now,
                read: false,
            },
            Notification {
                id: 2,
                kind: NotificationKind::Info,
                title: "Important password".to_string(),
                message: "Remember to use the password: foxorange224".to_string(),
                created_at: now - Duration::hours(1),
                read: false,
            },
        ]
    }

    pub async fn save(&self, store: &LocalStore) -> Result<(), StoreError> {
        store.set_json(keys::NOTIFICATIONS, &self.entries).await
    }

    /// Prepend a notification and evict beyond the cap. Returns its id.
    ///
    /// Ids are millisecond timestamps, bumped when needed so they stay
    /// strictly increasing.
    pub fn push(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> i64 {
        let id = now.timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        self.entries.insert(
            0,
            Notification {
                id,
                kind,
                title: title.into(),
                message: message.into(),
                created_at: now,
                read: false,
            },
        );
        self.entries.truncate(MAX_NOTIFICATIONS);
        id
    }

    /// Mark every entry read. Returns how many changed.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for entry in self.entries.iter_mut().filter(|n| !n.read) {
            entry.read = true;
            changed += 1;
        }
        changed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Human-readable age of a timestamp.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else {
        then.format("%Y-%m-%d").to_string()
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_push_prepends_and_caps() {
        let mut notifications = Notifications::default();
        for i in 0..(MAX_NOTIFICATIONS + 5) {
            notifications.push(NotificationKind::Info, format!("n{}", i), "", now());
        }

        assert_eq!(notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(notifications.entries()[0].title, "n54");
        assert_eq!(notifications.entries().last().unwrap().title, "n5");
    }

    #[test]
    fn test_ids_strictly_increase_within_same_millisecond() {
        let mut notifications = Notifications::default();
        let a = notifications.push(NotificationKind::Info, "a", "", now());
        let b = notifications.push(NotificationKind::Info, "b", "", now());
        assert!(b > a);
    }

    #[test]
    fn test_mark_all_read_and_unread_count() {
        let mut notifications = Notifications::from_entries(Notifications::defaults(now()));
        assert_eq!(notifications.unread_count(), 2);

        assert_eq!(notifications.mark_all_read(), 2);
        assert_eq!(notifications.unread_count(), 0);
        assert_eq!(notifications.mark_all_read(), 0);
    }

    #[test]
    fn test_serialized_field_names() {
        let notifications = Notifications::from_entries(Notifications::defaults(now()));
        let value = serde_json::to_value(notifications.entries()).unwrap();
        assert_eq!(value[0]["type"], "info");
        assert!(value[0]["date"].is_string());
        assert_eq!(value[1]["message"], "Remember to use the password: foxorange224");
    }

    #[tokio::test]
    async fn test_first_load_seeds_defaults_then_persists() {
        let store = LocalStore::open(":memory:").await.unwrap();
        let mut notifications = Notifications::load(&store, now()).await.unwrap();
        assert_eq!(notifications.len(), 2);

        let id = notifications.push(NotificationKind::Success, "Saved", "ok", now());
        notifications.save(&store).await.unwrap();

        let reloaded = Notifications::load(&store, now()).await.unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded.entries()[0].id, id);
        assert_eq!(reloaded.unread_count(), 3);
    }

    #[test]
    fn test_relative_time() {
        let n = now();
        assert_eq!(relative_time(n, n), "just now");
        assert_eq!(relative_time(n - Duration::minutes(1), n), "1 minute ago");
        assert_eq!(relative_time(n - Duration::minutes(5), n), "5 minutes ago");
        assert_eq!(relative_time(n - Duration::hours(3), n), "3 hours ago");
        assert_eq!(relative_time(n - Duration::days(2), n), "2 days ago");
        assert_eq!(relative_time(n - Duration::days(30), n), "2024-04-01");
    }
}
