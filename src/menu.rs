use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::domain::mess_type::MessType;
use crate::domain::session::Session;
use crate::domain::week::MenuDay;

/// Session name to the ordered list of items served.
pub type DayMenu = HashMap<String, Vec<String>>;
/// Weekday key (`monday`) to that day's menu.
pub type WeekMenu = HashMap<String, DayMenu>;
/// Week key (`weekA`) to that week's menu.
pub type DietMenu = HashMap<String, WeekMenu>;
/// Diet type to its four week cycle.
pub type MessMenu = HashMap<String, DietMenu>;

/// On-disk layout of a menu file: `{"menuSystem": {"<messType>": {...}}}`.
#[derive(Deserialize, Debug)]
struct MenuDocument {
    #[serde(rename = "menuSystem")]
    menu_system: HashMap<String, MessMenu>,
}

#[derive(thiserror::Error, Debug)]
pub enum MenuStoreError {
    #[error("Failed to read menu file {path}.")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Menu file {path} is not a valid menu document.")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Menu file {path} has no \"{mess_type}\" section.")]
    MissingSection { path: String, mess_type: String },
}

/// Read-only menus of every mess type, loaded once at startup.
#[derive(Debug, Default)]
pub struct MenuStore {
    menus: HashMap<MessType, MessMenu>,
}

impl MenuStore {
    /// Loads `south.json`, `north.json` and `unified.json` from `directory`.
    #[tracing::instrument(name = "Loading menu documents", skip(directory), fields(directory = %directory.as_ref().display()))]
    pub fn load(directory: impl AsRef<Path>) -> Result<Self, MenuStoreError> {
        let mut store = MenuStore::default();

        for mess_type in MessType::ALL {
            let path = directory
                .as_ref()
                .join(format!("{}.json", mess_type.as_ref()));
            let display_path = path.display().to_string();
            let raw = std::fs::read_to_string(&path).map_err(|source| MenuStoreError::Read {
                path: display_path.clone(),
                source,
            })?;

            store = store.with_document(mess_type, &raw, &display_path)?;
        }

        tracing::info!("Loaded menus for {} mess types", store.menus.len());

        Ok(store)
    }

    /// Adds the section for `mess_type` found in a raw menu document.
    pub fn with_document(
        mut self,
        mess_type: MessType,
        raw: &str,
        origin: &str,
    ) -> Result<Self, MenuStoreError> {
        let mut document: MenuDocument =
            serde_json::from_str(raw).map_err(|source| MenuStoreError::Parse {
                path: origin.to_string(),
                source,
            })?;
        let menu = document
            .menu_system
            .remove(mess_type.as_ref())
            .ok_or_else(|| MenuStoreError::MissingSection {
                path: origin.to_string(),
                mess_type: mess_type.as_ref().to_string(),
            })?;

        self.menus.insert(mess_type, menu);

        Ok(self)
    }

    /// Every session served on `day` for the given mess and diet, or `None`
    /// when the mess type is unknown or any key on the way is absent.
    pub fn day_menu(&self, mess_type: &str, diet_type: &str, day: &MenuDay) -> Option<&DayMenu> {
        let mess_type = MessType::parse(mess_type)?;

        self.menus
            .get(&mess_type)?
            .get(diet_type)?
            .get(&day.week.menu_key())?
            .get(&day.weekday_key())
    }

    /// Items served for one session, see [`MenuStore::day_menu`].
    pub fn session_menu(
        &self,
        mess_type: &str,
        diet_type: &str,
        day: &MenuDay,
        session: Session,
    ) -> Option<&[String]> {
        self.day_menu(mess_type, diet_type, day)?
            .get(session.as_ref())
            .map(Vec::as_slice)
    }
}
