use crate::helpers::TestApp;

#[tokio::test]
async fn api_answers_cross_origin_requests() {
    let test_app = TestApp::spawn_app().await;

    let response = reqwest::Client::new()
        .get(&format!("{}/api/current-week", test_app.address))
        .header("Origin", "http://menu.hostel.test")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("Access-Control-Allow-Origin")
            .and_then(|value| value.to_str().ok()),
        Some("http://menu.hostel.test")
    );
}

#[tokio::test]
async fn subscribe_preflight_is_allowed() {
    let test_app = TestApp::spawn_app().await;

    let response = reqwest::Client::new()
        .request(
            reqwest::Method::OPTIONS,
            &format!("{}/api/subscribe", test_app.address),
        )
        .header("Origin", "http://menu.hostel.test")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key("Access-Control-Allow-Methods"));
}
