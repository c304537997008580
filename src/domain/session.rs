/// A meal session of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Session {
    Breakfast,
    Lunch,
    Snacks,
    Dinner,
}

impl Session {
    pub const ALL: [Session; 4] = [
        Session::Breakfast,
        Session::Lunch,
        Session::Snacks,
        Session::Dinner,
    ];

    pub fn parse(session: String) -> Result<Session, String> {
        match session.trim().to_lowercase().as_str() {
            "breakfast" => Ok(Session::Breakfast),
            "lunch" => Ok(Session::Lunch),
            "snacks" => Ok(Session::Snacks),
            "dinner" => Ok(Session::Dinner),
            _ => Err(format!("{} is not a valid meal session", session)),
        }
    }

    /// Capitalised name, as used in email subjects.
    pub fn title(&self) -> &'static str {
        match self {
            Session::Breakfast => "Breakfast",
            Session::Lunch => "Lunch",
            Session::Snacks => "Snacks",
            Session::Dinner => "Dinner",
        }
    }
}

impl AsRef<str> for Session {
    fn as_ref(&self) -> &str {
        match self {
            Session::Breakfast => "breakfast",
            Session::Lunch => "lunch",
            Session::Snacks => "snacks",
            Session::Dinner => "dinner",
        }
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}
