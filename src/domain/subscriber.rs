use chrono::{DateTime, Utc};

use crate::domain::subscriber_email::SubscriberEmail;

/// A stored row of the `subscribers` table.
#[derive(Debug, serde::Serialize)]
pub struct Subscriber {
    pub id: i64,
    pub email: SubscriberEmail,
    pub mess_type: String,
    pub diet_type: String,
    pub mess_category: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}
