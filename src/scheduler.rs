use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use sqlx::SqlitePool;

use crate::clock::{mess_offset, Clock};
use crate::domain::session::Session;
use crate::domain::week::WeekRotation;
use crate::email_client::EmailClient;
use crate::menu::MenuStore;
use crate::notifications::send_session_notifications;

/// A session notification fired daily at a fixed mess-local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub at: NaiveTime,
    pub session: Session,
}

/// Daily trigger table, registered once at startup.
#[derive(Debug, Clone)]
pub struct Schedule {
    triggers: Vec<Trigger>,
}

impl Schedule {
    pub fn new(mut triggers: Vec<Trigger>) -> Self {
        triggers.sort_by_key(|trigger| trigger.at);

        Self { triggers }
    }

    /// Half an hour before each meal: breakfast 07:00, lunch 12:00,
    /// snacks 16:30, dinner 19:00.
    pub fn meal_reminders() -> Self {
        let trigger = |hour, minute, session| Trigger {
            at: NaiveTime::from_hms_opt(hour, minute, 0).expect("valid trigger time"),
            session,
        };

        Self::new(vec![
            trigger(6, 30, Session::Breakfast),
            trigger(11, 30, Session::Lunch),
            trigger(16, 0, Session::Snacks),
            trigger(18, 30, Session::Dinner),
        ])
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// First trigger strictly after `instant`, with the UTC instant it fires at.
    pub fn next_after(&self, instant: DateTime<Utc>) -> Option<(DateTime<Utc>, Session)> {
        let offset = mess_offset();
        let today = instant.with_timezone(&offset).date_naive();

        // Looking at today and tomorrow is enough for a daily table.
        [today, today + Duration::days(1)]
            .into_iter()
            .flat_map(|date| {
                self.triggers.iter().filter_map(move |trigger| {
                    offset
                        .from_local_datetime(&date.and_time(trigger.at))
                        .single()
                        .map(|fire_at| (fire_at.with_timezone(&Utc), trigger.session))
                })
            })
            .find(|(fire_at, _)| *fire_at > instant)
    }
}

/// Everything a notification batch needs, shared with the HTTP server.
#[derive(Clone)]
pub struct NotificationContext {
    pub db_pool: SqlitePool,
    pub email_client: Arc<EmailClient>,
    pub menus: Arc<MenuStore>,
    pub rotation: WeekRotation,
    pub clock: Arc<dyn Clock>,
}

/// Sends each session's batch at its trigger, forever.
pub async fn run_scheduler_until_stopped(
    schedule: Schedule,
    context: NotificationContext,
) -> Result<(), anyhow::Error> {
    let clock = context.clock.clone();

    run_schedule(schedule, clock, move |session, now| {
        let context = context.clone();

        async move { dispatch(&context, session, now).await }
    })
    .await
}

/// Sleeps until each trigger and calls `on_trigger` with its session and the
/// clock reading at wake-up. A trigger that passes while the process is down,
/// or while a previous call is still running, is not caught up, and no
/// trigger is handled twice.
pub async fn run_schedule<F, Fut>(
    schedule: Schedule,
    clock: Arc<dyn Clock>,
    mut on_trigger: F,
) -> Result<(), anyhow::Error>
where
    F: FnMut(Session, DateTime<Utc>) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut cursor = clock.now();

    loop {
        let now = clock.now().max(cursor);
        let (fire_at, session) = schedule
            .next_after(now)
            .ok_or_else(|| anyhow::anyhow!("The notification schedule has no triggers."))?;

        tracing::info!("Next notification: {} at {}", session, fire_at);

        let wait = (fire_at - clock.now()).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        cursor = fire_at;
        on_trigger(session, clock.now()).await;
    }
}

async fn dispatch(context: &NotificationContext, session: Session, now: DateTime<Utc>) {
    tracing::info!("Sending {} notifications...", session);

    if let Err(err) = send_session_notifications(
        &context.db_pool,
        &context.email_client,
        &context.menus,
        &context.rotation,
        now,
        session,
    )
    .await
    {
        tracing::error!(
            error.cause_chain = ?err,
            error.message = %err,
            "Failed to send {} notifications.",
            session
        );
    }
}
