use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use reqwest::Response;
use secrecy::Secret;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;
use wiremock::MockServer;

use mess_notifier::{
    clock::{mess_offset, FixedClock},
    config::{get_configuration, Settings},
    domain::session::Session,
    notifications::{send_session_notifications, DispatchReport},
    scheduler::NotificationContext,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

// Tracing is initialised once for the whole test binary. Set TEST_LOG to see it.
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        init_subscriber(get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::stdout,
        ));
    } else {
        init_subscriber(get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::sink,
        ));
    }
});

pub struct TestApp {
    pub config: Settings,
    pub address: String,
    pub db_pool: SqlitePool,
    pub email_server: MockServer,
    pub context: NotificationContext,
}

/// 08:00 in the mess on Wednesday 2024-01-10, a week D day.
pub fn default_instant() -> DateTime<Utc> {
    mess_time(2024, 1, 10, 8, 0)
}

pub fn mess_time(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    mess_offset()
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
        .with_timezone(&Utc)
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        Self::spawn_app_at(default_instant()).await
    }

    pub async fn spawn_app_at(instant: DateTime<Utc>) -> TestApp {
        Lazy::force(&TRACING);

        let mut config = get_configuration().expect("Missing configuration file.");
        let db_path = std::env::temp_dir().join(format!("mess_notifier_{}.sqlite", Uuid::new_v4()));
        let email_server = MockServer::start().await;

        // Port 0 lets the OS pick a free port, so tests can run in parallel
        config.set_app_port(0);
        config.set_db_path(db_path);
        config.set_email_client_base_url(email_server.uri());
        config.email_client.sender_email = Some("mess@hostel.com".into());
        config.email_client.api_key = Some(Secret::new("test-api-key".into()));

        let application = Application::build_with_clock(config.clone(), Arc::new(FixedClock::new(instant)))
            .await
            .expect("Failed to build application.");

        let address = format!("http://127.0.0.1:{}", application.get_port());
        let (server, context) = application.into_parts();

        tokio::spawn(server);

        TestApp {
            address,
            config,
            db_pool: context.db_pool.clone(),
            email_server,
            context,
        }
    }

    pub async fn post_subscription(&self, body: serde_json::Value) -> Response {
        reqwest::Client::new()
            .post(&format!("{}/api/subscribe", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn subscribe(&self, email: &str, mess_type: &str, diet_type: &str, mess_category: &str) {
        self.post_subscription(serde_json::json!({
            "email": email,
            "messType": mess_type,
            "dietType": diet_type,
            "messCategory": mess_category,
        }))
        .await
        .error_for_status()
        .expect("Failed to subscribe.");
    }

    pub async fn get_current_week(&self) -> Response {
        reqwest::Client::new()
            .get(&format!("{}/api/current-week", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_test_email(&self, body: serde_json::Value) -> Response {
        reqwest::Client::new()
            .post(&format!("{}/api/test-email", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Runs one notification batch as the scheduler would at `now`.
    pub async fn dispatch(&self, session: Session, now: DateTime<Utc>) -> DispatchReport {
        send_session_notifications(
            &self.db_pool,
            &self.context.email_client,
            &self.context.menus,
            &self.context.rotation,
            now,
            session,
        )
        .await
        .expect("Failed to dispatch notifications.")
    }
}
