use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{error::InternalError, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use crate::clock::{Clock, SystemClock};
use crate::config::{DatabaseSettings, Settings};
use crate::menu::MenuStore;
use crate::routes::{
    current_week, handle_create_subscription, handle_test_email, health_check, home, home_script,
    ApiResponse, StaticDir,
};
use crate::scheduler::NotificationContext;

pub struct Application {
    pub port: u16,
    pub server: Server,
    context: NotificationContext,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        Self::build_with_clock(config, Arc::new(SystemClock)).await
    }

    pub async fn build_with_clock(
        config: Settings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, anyhow::Error> {
        let db_pool = get_connection_db_pool(&config.database);

        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("Failed to run database migrations.")?;

        let email_client = Arc::new(config.email_client.client()?);
        let menus = Arc::new(
            MenuStore::load(&config.menu.directory).context("Failed to load the menu documents.")?,
        );
        let rotation = config.get_week_rotation();

        let listener = TcpListener::bind(config.get_address())
            .with_context(|| format!("Failed to bind the address {}.", config.get_address()))?;
        let port = listener.local_addr()?.port();

        let context = NotificationContext {
            db_pool,
            email_client,
            menus,
            rotation,
            clock,
        };
        let server = run(
            listener,
            &context,
            StaticDir(config.application.static_dir.clone()),
        )?;

        Ok(Self {
            port,
            server,
            context,
        })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    /// Splits the server from the pieces the notification scheduler shares with it.
    pub fn into_parts(self) -> (Server, NotificationContext) {
        (self.server, self.context)
    }
}

pub fn run(
    listener: TcpListener,
    context: &NotificationContext,
    static_dir: StaticDir,
) -> Result<Server, std::io::Error> {
    let db_pool = web::Data::new(context.db_pool.clone());
    let email_client = web::Data::from(context.email_client.clone());
    let clock: web::Data<dyn Clock> = web::Data::from(context.clock.clone());
    let rotation = web::Data::new(context.rotation);
    let static_dir = web::Data::new(static_dir);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            // Any origin may call the API
            .wrap(Cors::permissive())
            .app_data(json_config())
            .route("/", web::get().to(home))
            .route("/script.js", web::get().to(home_script))
            .route("/health_check", web::get().to(health_check))
            .route("/api/subscribe", web::post().to(handle_create_subscription))
            .route("/api/current-week", web::get().to(current_week))
            .route("/api/test-email", web::post().to(handle_test_email))
            .app_data(db_pool.clone())
            .app_data(email_client.clone())
            .app_data(clock.clone())
            .app_data(rotation.clone())
            .app_data(static_dir.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Bodies that are not valid JSON get the same `{success, message}` shape as
/// every other failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ApiResponse::failure(format!(
            "Invalid request body: {}",
            err
        )));

        InternalError::from_response(err, response).into()
    })
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> SqlitePool {
    SqlitePoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(config.get_db_options())
}

