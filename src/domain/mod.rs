pub mod menu_label;
pub mod mess_type;
pub mod new_subscriber;
pub mod session;
pub mod subscriber;
pub mod subscriber_email;
pub mod week;
