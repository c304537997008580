use htmlescape::encode_minimal;

use crate::domain::session::Session;
use crate::domain::week::MenuDay;

/// What the subscriber picked, shown in the email header.
pub struct Selection<'a> {
    pub mess_type: &'a str,
    pub diet_type: &'a str,
    pub mess_category: &'a str,
}

pub fn notification_subject(session: Session) -> String {
    format!("🍽️ {} Menu - Starting in 30 minutes!", session.title())
}

pub fn test_subject(session: Session) -> String {
    format!("🧪 Test Email - {} Menu", session)
}

/// HTML body of a meal notification.
pub fn render_menu_email(
    items: &[String],
    session: Session,
    selection: &Selection<'_>,
    day: &MenuDay,
) -> String {
    let items_html: String = items
        .iter()
        .map(|item| {
            format!(
                r#"<li style="margin: 5px 0; font-size: 14px;">{}</li>"#,
                encode_minimal(item)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"
<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f9f9f9;">
  <div style="background-color: #2c3e50; color: white; padding: 20px; text-align: center; border-radius: 10px 10px 0 0;">
    <h1 style="margin: 0; font-size: 24px;">🍽️ Mess Menu Notification</h1>
    <p style="margin: 10px 0 0 0; font-size: 16px;">{mess_type} {diet_type} - Category {mess_category}</p>
  </div>
  <div style="background-color: white; padding: 20px; border-radius: 0 0 10px 10px;">
    <div style="text-align: center; margin-bottom: 20px;">
      <h2 style="color: #34495e; margin: 0; font-size: 20px;">{session} MENU</h2>
      <p style="color: #7f8c8d; margin: 5px 0;">{weekday}, Week {week}</p>
      <p style="color: #e74c3c; font-weight: bold; margin: 5px 0;">⏰ Starting in 30 minutes!</p>
    </div>
    <div style="background-color: #ecf0f1; padding: 15px; border-radius: 8px; margin-bottom: 20px;">
      <h3 style="color: #2c3e50; margin: 0 0 10px 0; font-size: 16px;">📋 Today's Items:</h3>
      <ul style="margin: 0; padding-left: 20px; color: #34495e;">
{items_html}
      </ul>
    </div>
    <div style="background-color: #e8f5e8; padding: 15px; border-radius: 8px; border-left: 4px solid #27ae60;">
      <h4 style="color: #27ae60; margin: 0 0 10px 0; font-size: 14px;">📌 Additional Information:</h4>
      <p style="margin: 0; font-size: 12px; color: #2c3e50; line-height: 1.4;">
        <strong>Always Available:</strong> Brown &amp; White Bread, Butter, Tea, Coffee, Milk, Sugar<br>
        <strong>With Lunch &amp; Snacks:</strong> Plain Rice, Curd, Salt, Sugar, Papad/Fryums &amp; Salad<br>
        <strong>With Dinner:</strong> Buttermilk/Lemon Juice, Papad/Fryums &amp; Salad, Cut onion, Mirchi, Lemon
      </p>
    </div>
    <div style="text-align: center; margin-top: 20px; padding-top: 20px; border-top: 1px solid #ecf0f1;">
      <p style="color: #7f8c8d; font-size: 12px; margin: 0;">
        You're receiving this because you subscribed to mess notifications.<br>
        Have a great meal! 🍽️
      </p>
    </div>
  </div>
</div>
"#,
        mess_type = encode_minimal(&selection.mess_type.to_uppercase()),
        diet_type = encode_minimal(&selection.diet_type.to_uppercase()),
        mess_category = encode_minimal(&selection.mess_category.to_uppercase()),
        session = session.as_ref().to_uppercase(),
        weekday = day.weekday_name(),
        week = day.week,
        items_html = items_html,
    )
}
