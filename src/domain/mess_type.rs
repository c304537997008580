/// The three canteen menu variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessType {
    South,
    North,
    Unified,
}

impl MessType {
    pub const ALL: [MessType; 3] = [MessType::South, MessType::North, MessType::Unified];

    /// Returns `None` for anything that is not a known variant.
    pub fn parse(mess_type: &str) -> Option<MessType> {
        match mess_type.trim().to_lowercase().as_str() {
            "south" => Some(MessType::South),
            "north" => Some(MessType::North),
            "unified" => Some(MessType::Unified),
            _ => None,
        }
    }
}

impl AsRef<str> for MessType {
    fn as_ref(&self) -> &str {
        match self {
            MessType::South => "south",
            MessType::North => "north",
            MessType::Unified => "unified",
        }
    }
}
