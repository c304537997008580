mod current_week;
mod home;
mod subscriptions;
mod test_email;

pub use current_week::*;
pub use home::*;
pub use subscriptions::*;
pub use test_email::*;

/// JSON body shared by every write endpoint of the API.
#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
