use unicode_segmentation::UnicodeSegmentation;

const MAX_CHAR_LENGTH: usize = 64;

/// A free-form selection made by a subscriber: mess type, diet type or category.
///
/// Labels are kept as typed so that they keep matching the keys of the menu
/// documents; only blank and oversized values are rejected.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MenuLabel(String);

impl MenuLabel {
    pub fn parse(label: String) -> Result<MenuLabel, String> {
        let label = label.trim().to_string();
        let is_empty = label.is_empty();
        let is_too_long = label.graphemes(true).count() > MAX_CHAR_LENGTH;

        if is_empty || is_too_long {
            return Err(format!("{} is not a valid menu selection", label));
        }

        Ok(Self(label))
    }
}

impl AsRef<str> for MenuLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
