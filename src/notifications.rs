use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::domain::session::Session;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::week::WeekRotation;
use crate::email_client::EmailClient;
use crate::menu::MenuStore;
use crate::menu_email::{notification_subject, render_menu_email, Selection};

/// Outcome of one notification batch. Partial delivery is a normal result.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub subscribers: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to get active subscribers from the database.")]
    GetSubscribersError(#[source] sqlx::Error),
}

impl std::fmt::Debug for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::error_chain_fmt(self, f)
    }
}

struct ActiveSubscriber {
    email: String,
    mess_type: String,
    diet_type: String,
    mess_category: String,
}

/// Emails today's `session` menu to every active subscriber, one at a time.
///
/// Subscribers without a menu for the session are skipped, and a failed send
/// is logged without stopping the batch.
#[tracing::instrument(
    name = "Sending meal notifications",
    skip(db_pool, email_client, menus, rotation),
    fields(session = %session, week = tracing::field::Empty, day = tracing::field::Empty)
)]
pub async fn send_session_notifications(
    db_pool: &SqlitePool,
    email_client: &EmailClient,
    menus: &MenuStore,
    rotation: &WeekRotation,
    now: DateTime<Utc>,
    session: Session,
) -> Result<DispatchReport, DispatchError> {
    let subscribers = get_active_subscribers(db_pool).await?;
    let day = rotation.menu_day(now);
    let subject = notification_subject(session);
    let mut report = DispatchReport {
        subscribers: subscribers.len(),
        ..Default::default()
    };

    tracing::Span::current()
        .record("week", &tracing::field::display(day.week))
        .record("day", &tracing::field::display(day.weekday_name()));
    tracing::info!(
        "Sending {} notifications to {} subscribers",
        session,
        subscribers.len()
    );

    for subscriber in subscribers {
        let email = match SubscriberEmail::parse(subscriber.email.clone()) {
            Ok(email) => email,
            Err(err) => {
                tracing::error!(
                    error.message = %err,
                    "Skipping an active subscriber. Their stored email is invalid.",
                );
                report.skipped += 1;
                continue;
            }
        };

        let items = match menus.session_menu(
            &subscriber.mess_type,
            &subscriber.diet_type,
            &day,
            session,
        ) {
            Some(items) => items,
            None => {
                tracing::info!(
                    "No menu found for {} - {} {} {}",
                    email,
                    subscriber.mess_type,
                    subscriber.diet_type,
                    subscriber.mess_category
                );
                report.skipped += 1;
                continue;
            }
        };

        let selection = Selection {
            mess_type: &subscriber.mess_type,
            diet_type: &subscriber.diet_type,
            mess_category: &subscriber.mess_category,
        };
        let html_body = render_menu_email(items, session, &selection, &day);

        match email_client.send_email(&email, &subject, &html_body).await {
            Ok(()) => {
                tracing::info!("Email sent to {} for {}", email, session);
                report.sent += 1;
            }
            Err(err) => {
                tracing::error!(
                    error.cause_chain = ?err,
                    error.message = %err,
                    "Failed to send {} notification to {}. Skipping.",
                    session,
                    email
                );
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        sent = report.sent,
        skipped = report.skipped,
        failed = report.failed,
        "Finished sending {} notifications",
        session
    );

    Ok(report)
}

#[tracing::instrument(name = "Get active subscribers from the database", skip(db_pool))]
async fn get_active_subscribers(db_pool: &SqlitePool) -> Result<Vec<ActiveSubscriber>, DispatchError> {
    sqlx::query(
        r#"
        SELECT email, mess_type, diet_type, mess_category
        FROM subscribers
        WHERE is_active = 1
        ORDER BY id
        "#,
    )
    .map(|row: SqliteRow| ActiveSubscriber {
        email: row.get("email"),
        mess_type: row.get("mess_type"),
        diet_type: row.get("diet_type"),
        mess_category: row.get("mess_category"),
    })
    .fetch_all(db_pool)
    .await
    .map_err(DispatchError::GetSubscribersError)
}
