use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use serde::Deserialize;

use crate::clock::Clock;
use crate::domain::{session::Session, subscriber_email::SubscriberEmail, week::WeekRotation};
use crate::email_client::{EmailClient, EmailClientError};
use crate::menu_email::{render_menu_email, test_subject, Selection};
use crate::routes::ApiResponse;

const TEST_SELECTION: Selection<'static> = Selection {
    mess_type: "south",
    diet_type: "vegetarian",
    mess_category: "A",
};

#[derive(Deserialize, Debug)]
pub struct TestEmailBody {
    pub email: Option<String>,
    pub session: Option<String>,
}

/// Sends a canned three item menu so delivery can be checked by hand.
#[tracing::instrument(
    name = "Sending a test email",
    skip(body, email_client, clock, rotation),
    fields(recipient = ?body.email, session = ?body.session)
)]
pub async fn handle_test_email(
    body: web::Json<TestEmailBody>,
    email_client: web::Data<EmailClient>,
    clock: web::Data<dyn Clock>,
    rotation: web::Data<WeekRotation>,
) -> Result<HttpResponse, TestEmailError> {
    let TestEmailBody { email, session } = body.into_inner();
    let email = SubscriberEmail::parse(email.unwrap_or_default())
        .map_err(TestEmailError::InvalidEmail)?;
    let session = match session.filter(|session| !session.trim().is_empty()) {
        Some(session) => Session::parse(session).map_err(TestEmailError::InvalidSession)?,
        None => Session::Breakfast,
    };

    let items: Vec<String> = (1..=3).map(|n| format!("Test Item {}", n)).collect();
    let day = rotation.menu_day(clock.now());
    let html_body = render_menu_email(&items, session, &TEST_SELECTION, &day);

    email_client
        .send_email(&email, &test_subject(session), &html_body)
        .await
        .map_err(TestEmailError::SendEmailError)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Test email sent successfully!")))
}

#[derive(thiserror::Error)]
pub enum TestEmailError {
    #[error("Please enter a valid email address")]
    InvalidEmail(String),
    #[error("{0}")]
    InvalidSession(String),
    #[error("Failed to send test email")]
    SendEmailError(#[source] EmailClientError),
}

impl std::fmt::Debug for TestEmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::error_chain_fmt(self, f)
    }
}

impl ResponseError for TestEmailError {
    fn status_code(&self) -> StatusCode {
        match self {
            TestEmailError::InvalidEmail(_) | TestEmailError::InvalidSession(_) => {
                StatusCode::BAD_REQUEST
            }
            TestEmailError::SendEmailError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::failure(self.to_string()))
    }
}
