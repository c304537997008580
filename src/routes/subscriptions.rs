use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::{
    clock::Clock,
    domain::{
        new_subscriber::{NewSubscriber, NewSubscriberBody, NewSubscriberError},
        subscriber::Subscriber,
        subscriber_email::SubscriberEmail,
    },
    routes::ApiResponse,
};

// SQLite extended result codes for UNIQUE and PRIMARY KEY violations.
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";

#[tracing::instrument(
    name = "Creating a new subscriber handler",
    skip(body, db_pool, clock),
    fields(
        subscriber_email = ?body.email,
        mess_type = ?body.mess_type,
        diet_type = ?body.diet_type,
        mess_category = ?body.mess_category
    )
)]
pub async fn handle_create_subscription(
    body: web::Json<NewSubscriberBody>,
    db_pool: web::Data<SqlitePool>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, SubscribeError> {
    let new_subscriber: NewSubscriber = body.into_inner().try_into()?;

    if find_subscriber_by_email(&new_subscriber.email, &db_pool)
        .await
        .map_err(SubscribeError::LookupError)?
        .is_some()
    {
        return Err(SubscribeError::AlreadySubscribed);
    }

    let subscriber = create_subscription(&new_subscriber, clock.now(), &db_pool)
        .await
        .map_err(SubscribeError::from_insert_error)?;

    tracing::info!(
        "New subscriber: {} - {} {} {}",
        subscriber.email,
        subscriber.mess_type,
        subscriber.diet_type,
        subscriber.mess_category
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Successfully subscribed to mess notifications!",
    )))
}

#[tracing::instrument(name = "Look up a subscriber by email", skip(email, db_pool))]
pub async fn find_subscriber_by_email(
    email: &SubscriberEmail,
    db_pool: &SqlitePool,
) -> Result<Option<Subscriber>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT id, email, mess_type, diet_type, mess_category, created_at, is_active
        FROM subscribers
        WHERE email = ?
        "#,
    )
    .bind(email.as_ref())
    .try_map(subscriber_from_row)
    .fetch_optional(db_pool)
    .await
}

#[tracing::instrument(
    name = "Insert a new subscriber into the database",
    skip(new_subscriber, db_pool)
)]
async fn create_subscription(
    new_subscriber: &NewSubscriber,
    created_at: DateTime<Utc>,
    db_pool: &SqlitePool,
) -> Result<Subscriber, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO subscribers (email, mess_type, diet_type, mess_category, created_at, is_active)
        VALUES (?, ?, ?, ?, ?, 1)
        RETURNING id, email, mess_type, diet_type, mess_category, created_at, is_active
        "#,
    )
    .bind(new_subscriber.email.as_ref())
    .bind(new_subscriber.mess_type.as_ref())
    .bind(new_subscriber.diet_type.as_ref())
    .bind(new_subscriber.mess_category.as_ref())
    .bind(created_at)
    .try_map(subscriber_from_row)
    .fetch_one(db_pool)
    .await
    .map_err(|err| {
        tracing::error!("Failed to execute query: {:?}", err);
        err
    })
}

fn subscriber_from_row(row: SqliteRow) -> Result<Subscriber, sqlx::Error> {
    let email = SubscriberEmail::parse(row.try_get("email")?).map_err(|err| {
        sqlx::Error::ColumnDecode {
            index: "email".into(),
            source: err.into(),
        }
    })?;

    Ok(Subscriber {
        id: row.try_get("id")?,
        email,
        mess_type: row.try_get("mess_type")?,
        diet_type: row.try_get("diet_type")?,
        mess_category: row.try_get("mess_category")?,
        created_at: row.try_get("created_at")?,
        is_active: row.try_get("is_active")?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .map(|code| code == SQLITE_CONSTRAINT_UNIQUE || code == SQLITE_CONSTRAINT_PRIMARYKEY)
        .unwrap_or(false)
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("All fields are required")]
    MissingFields,
    #[error("Please enter a valid email address")]
    InvalidEmail(String),
    #[error("{0}")]
    InvalidSelection(String),
    #[error("This email is already subscribed to notifications")]
    AlreadySubscribed,
    #[error("Database error occurred")]
    LookupError(#[source] sqlx::Error),
    #[error("Failed to subscribe")]
    InsertError(#[source] sqlx::Error),
}

impl SubscribeError {
    /// A UNIQUE violation here means another request stored the same email
    /// after the pre-check.
    fn from_insert_error(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            SubscribeError::AlreadySubscribed
        } else {
            SubscribeError::InsertError(err)
        }
    }
}

impl From<NewSubscriberError> for SubscribeError {
    fn from(err: NewSubscriberError) -> Self {
        match err {
            NewSubscriberError::MissingFields => SubscribeError::MissingFields,
            NewSubscriberError::InvalidEmail(reason) => SubscribeError::InvalidEmail(reason),
            NewSubscriberError::InvalidSelection(reason) => SubscribeError::InvalidSelection(reason),
        }
    }
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::MissingFields
            | SubscribeError::InvalidEmail(_)
            | SubscribeError::InvalidSelection(_) => StatusCode::BAD_REQUEST,
            SubscribeError::AlreadySubscribed => StatusCode::CONFLICT,
            SubscribeError::LookupError(_) | SubscribeError::InsertError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::failure(self.to_string()))
    }
}
