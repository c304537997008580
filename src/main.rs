use std::fmt::{Debug, Display};

use tokio::task::JoinError;

use mess_notifier::clock::{Clock, MESS_TIMEZONE};
use mess_notifier::config::get_configuration;
use mess_notifier::scheduler::{run_scheduler_until_stopped, Schedule};
use mess_notifier::startup::Application;
use mess_notifier::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber(
        String::from("mess_notifier"),
        String::from("info"),
        std::io::stdout,
    );

    init_subscriber(subscriber);

    let config = get_configuration()?;
    let scheduler_enabled = config.scheduler.enabled;
    let address = config.get_address();
    let application = Application::build(config).await?;
    let (server, context) = application.into_parts();

    tracing::info!("Mess notification system running on {}", address);
    tracing::info!(
        "Mail configured: {}",
        if context.email_client.has_credentials() { "Yes" } else { "No" }
    );
    tracing::info!(
        "Current week: {}",
        context.rotation.week_at(context.clock.now())
    );
    tracing::info!(
        "Current time ({}): {}",
        MESS_TIMEZONE,
        context.clock.local_now().format("%Y-%m-%d %H:%M:%S")
    );

    let server_task = tokio::spawn(server);

    if scheduler_enabled {
        let scheduler_task = tokio::spawn(run_scheduler_until_stopped(
            Schedule::meal_reminders(),
            context,
        ));

        tokio::select! {
            outcome = server_task => report_exit("API", outcome),
            outcome = scheduler_task => report_exit("Notification scheduler", outcome),
        };
    } else {
        tracing::warn!("Notification scheduler is disabled");
        report_exit("API", server_task.await);
    }

    Ok(())
}

fn report_exit(task_name: &str, outcome: Result<Result<(), impl Debug + Display>, JoinError>) {
    match outcome {
        Ok(Ok(())) => {
            tracing::info!("{} has exited", task_name)
        }
        Ok(Err(e)) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "{} failed",
                task_name
            )
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "{} task failed to complete",
                task_name
            )
        }
    }
}
