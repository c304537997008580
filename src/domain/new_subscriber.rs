use serde::Deserialize;

use crate::domain::menu_label::MenuLabel;
use crate::domain::subscriber_email::SubscriberEmail;

pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub mess_type: MenuLabel,
    pub diet_type: MenuLabel,
    pub mess_category: MenuLabel,
}

/// Body of `POST /api/subscribe`. Every field is optional here so that a
/// missing one is reported with the API's own message.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscriberBody {
    pub email: Option<String>,
    pub mess_type: Option<String>,
    pub diet_type: Option<String>,
    pub mess_category: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum NewSubscriberError {
    MissingFields,
    InvalidEmail(String),
    InvalidSelection(String),
}

impl TryFrom<NewSubscriberBody> for NewSubscriber {
    type Error = NewSubscriberError;

    fn try_from(body: NewSubscriberBody) -> Result<Self, Self::Error> {
        let (email, mess_type, diet_type, mess_category) = match (
            non_blank(body.email),
            non_blank(body.mess_type),
            non_blank(body.diet_type),
            non_blank(body.mess_category),
        ) {
            (Some(email), Some(mess_type), Some(diet_type), Some(mess_category)) => {
                (email, mess_type, diet_type, mess_category)
            }
            _ => return Err(NewSubscriberError::MissingFields),
        };

        let email = SubscriberEmail::parse(email).map_err(NewSubscriberError::InvalidEmail)?;
        let mess_type = MenuLabel::parse(mess_type).map_err(NewSubscriberError::InvalidSelection)?;
        let diet_type = MenuLabel::parse(diet_type).map_err(NewSubscriberError::InvalidSelection)?;
        let mess_category =
            MenuLabel::parse(mess_category).map_err(NewSubscriberError::InvalidSelection)?;

        Ok(NewSubscriber {
            email,
            mess_type,
            diet_type,
            mess_category,
        })
    }
}

fn non_blank(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}
