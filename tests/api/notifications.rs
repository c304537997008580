use mess_notifier::domain::session::Session;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{mess_time, TestApp};

/// Matches mail API requests addressed to one recipient.
struct RecipientMatcher {
    email: &'static str,
    negate: bool,
}

impl wiremock::Match for RecipientMatcher {
    fn matches(&self, request: &wiremock::Request) -> bool {
        let body: serde_json::Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return false,
        };
        let is_recipient = body["personalizations"][0]["to"][0]["email"] == self.email;

        is_recipient != self.negate
    }
}

fn sent_bodies(requests: &[wiremock::Request]) -> Vec<serde_json::Value> {
    requests
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

#[tokio::test]
async fn notifications_are_sent_only_to_subscribers_with_a_menu() {
    let test_app = TestApp::spawn_app().await;

    test_app.subscribe("south@hostel.com", "south", "vegetarian", "A").await;
    test_app.subscribe("north@hostel.com", "north", "nonVegetarian", "B").await;
    test_app.subscribe("east@hostel.com", "east", "vegetarian", "A").await;
    test_app.subscribe("vegan@hostel.com", "unified", "vegan", "C").await;

    Mock::given(path("/mail/send"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&test_app.email_server)
        .await;

    let report = test_app
        .dispatch(Session::Lunch, mess_time(2024, 1, 10, 11, 30))
        .await;

    assert_eq!(report.subscribers, 4);
    assert_eq!(report.sent, 2);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn notification_carries_the_session_menu() {
    let test_app = TestApp::spawn_app().await;

    test_app.subscribe("south@hostel.com", "south", "vegetarian", "A").await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let now = mess_time(2024, 1, 10, 6, 30);
    test_app.dispatch(Session::Breakfast, now).await;

    let day = test_app.context.rotation.menu_day(now);
    let expected_items = test_app
        .context
        .menus
        .session_menu("south", "vegetarian", &day, Session::Breakfast)
        .expect("Sample menus should cover south vegetarian breakfast.")
        .to_vec();

    let requests = test_app.email_server.received_requests().await.unwrap();
    let sent = sent_bodies(&requests);

    assert_eq!(sent[0]["subject"], "🍽️ Breakfast Menu - Starting in 30 minutes!");

    let html = sent[0]["content"][0]["value"].as_str().unwrap();

    assert!(html.contains("Week D"));
    assert!(html.contains("Wednesday"));
    for item in expected_items {
        assert!(
            html.contains(&htmlescape::encode_minimal(&item)),
            "The email is missing the menu item {}.",
            item
        );
    }
}

#[tokio::test]
async fn one_failed_send_does_not_stop_the_batch() {
    let test_app = TestApp::spawn_app().await;

    test_app.subscribe("first@hostel.com", "south", "vegetarian", "A").await;
    test_app.subscribe("broken@hostel.com", "south", "vegetarian", "A").await;
    test_app.subscribe("last@hostel.com", "unified", "nonVegetarian", "D").await;

    Mock::given(RecipientMatcher {
        email: "broken@hostel.com",
        negate: false,
    })
    .respond_with(ResponseTemplate::new(500))
    .expect(1)
    .mount(&test_app.email_server)
    .await;

    Mock::given(RecipientMatcher {
        email: "broken@hostel.com",
        negate: true,
    })
    .respond_with(ResponseTemplate::new(200))
    .expect(2)
    .mount(&test_app.email_server)
    .await;

    let report = test_app
        .dispatch(Session::Dinner, mess_time(2024, 1, 10, 18, 30))
        .await;

    assert_eq!(report.sent, 2);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn inactive_subscribers_are_not_notified() {
    let test_app = TestApp::spawn_app().await;

    test_app.subscribe("active@hostel.com", "south", "vegetarian", "A").await;
    test_app.subscribe("paused@hostel.com", "south", "vegetarian", "A").await;

    sqlx::query("UPDATE subscribers SET is_active = 0 WHERE email = ?")
        .bind("paused@hostel.com")
        .execute(&test_app.db_pool)
        .await
        .expect("Failed to deactivate the subscriber.");

    Mock::given(RecipientMatcher {
        email: "active@hostel.com",
        negate: false,
    })
    .respond_with(ResponseTemplate::new(200))
    .expect(1)
    .mount(&test_app.email_server)
    .await;

    let report = test_app
        .dispatch(Session::Snacks, mess_time(2024, 1, 10, 16, 0))
        .await;

    assert_eq!(report.subscribers, 1);
    assert_eq!(report.sent, 1);
}

#[tokio::test]
async fn dispatch_with_no_subscribers_sends_nothing() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.email_server)
        .await;

    let report = test_app
        .dispatch(Session::Breakfast, mess_time(2024, 1, 10, 6, 30))
        .await;

    assert_eq!(report.subscribers, 0);
    assert_eq!(report.sent, 0);
}
