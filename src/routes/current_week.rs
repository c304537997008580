use actix_web::{web, HttpResponse};

use crate::clock::{Clock, MESS_TIMEZONE};
use crate::domain::week::WeekRotation;

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
pub struct CurrentWeek {
    pub week: String,
    pub day: String,
    pub timezone: String,
}

impl CurrentWeek {
    pub fn resolve(clock: &dyn Clock, rotation: &WeekRotation) -> Self {
        let day = rotation.menu_day(clock.now());

        Self {
            week: day.week.to_string(),
            day: day.weekday_name().to_string(),
            timezone: MESS_TIMEZONE.to_string(),
        }
    }
}

#[tracing::instrument(name = "Current week handler", skip(clock, rotation))]
pub async fn current_week(
    clock: web::Data<dyn Clock>,
    rotation: web::Data<WeekRotation>,
) -> HttpResponse {
    HttpResponse::Ok().json(CurrentWeek::resolve(clock.get_ref(), &rotation))
}
