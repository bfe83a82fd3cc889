//! Target profiles and the settings the loop reads under lock

use crate::core::types::HuntResult;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Profile name matching any target
pub const WILDCARD: &str = "*";

/// Whether the controller walks toward an out-of-range target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "StanceRepr", rename_all = "snake_case")]
pub enum Stance {
    #[default]
    Hold,
    Chase,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StanceRepr {
    Code(i64),
    Name(String),
}

impl TryFrom<StanceRepr> for Stance {
    type Error = String;

    fn try_from(repr: StanceRepr) -> Result<Self, Self::Error> {
        match repr {
            // Exported profiles use 1 for chase
            StanceRepr::Code(1) => Ok(Stance::Chase),
            StanceRepr::Code(_) => Ok(Stance::Hold),
            StanceRepr::Name(name) => match name.to_ascii_lowercase().as_str() {
                "hold" | "stay" => Ok(Stance::Hold),
                "chase" => Ok(Stance::Chase),
                other => Err(format!("unknown stance '{}'", other)),
            },
        }
    }
}

/// How to engage one kind of target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProfile {
    #[serde(alias = "Name")]
    pub name: String,
    /// Tile distance to keep; 0 means melee or no distance gate
    #[serde(default, alias = "Dist")]
    pub engage_distance: u32,
    #[serde(default, alias = "Stance")]
    pub stance: Stance,
    #[serde(default, alias = "Skin", deserialize_with = "skin_hotkey")]
    pub skin_hotkey: Option<u32>,
}

fn skin_hotkey<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let key = Option::<u32>::deserialize(deserializer)?;
    Ok(key.filter(|k| *k > 0))
}

impl TargetProfile {
    pub fn new(name: impl Into<String>, engage_distance: u32, stance: Stance) -> Self {
        TargetProfile {
            name: name.into(),
            engage_distance,
            stance,
            skin_hotkey: None,
        }
    }

    pub fn with_skin(mut self, hotkey: u32) -> Self {
        self.skin_hotkey = Some(hotkey);
        self
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == WILDCARD
    }

    /// Case-insensitive match used for on-screen battle-list text
    pub fn matches_text(&self, text: &str) -> bool {
        self.is_wildcard() || self.name.eq_ignore_ascii_case(text.trim())
    }
}

/// First exact name match, else the wildcard profile
pub fn match_profile<'a>(profiles: &'a [TargetProfile], name: &str) -> Option<&'a TargetProfile> {
    profiles
        .iter()
        .find(|p| p.name == name)
        .or_else(|| profiles.iter().find(|p| p.is_wildcard()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProfileFile {
    List(Vec<TargetProfile>),
    Wrapped {
        #[serde(alias = "Targets")]
        targets: Vec<TargetProfile>,
    },
}

/// Reads profiles from a JSON export, either a bare list or `{"targets": [...]}`
pub fn load_profiles_json(path: impl AsRef<Path>) -> HuntResult<Vec<TargetProfile>> {
    let contents = fs::read_to_string(path)?;
    parse_profiles_json(&contents)
}

pub fn parse_profiles_json(contents: &str) -> HuntResult<Vec<TargetProfile>> {
    let profiles = match serde_json::from_str(contents)? {
        ProfileFile::List(list) => list,
        ProfileFile::Wrapped { targets } => targets,
    };
    Ok(profiles)
}

/// What the looting collaborator does once a corpse is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LootMode {
    /// Open corpses without moving items
    OpenOnly,
    #[default]
    Collect,
}

/// Items the looting collaborator picks up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LootTable(pub Vec<String>);

impl LootTable {
    pub fn new(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        LootTable(items.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn items(&self) -> &[String] {
        &self.0
    }
}

/// Fields that may change while the loop runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSettings {
    pub loot_mode: LootMode,
    pub profiles: Vec<TargetProfile>,
}

/// Live settings behind their own short-lived lock
#[derive(Debug, Clone, Default)]
pub struct SharedSettings(Arc<Mutex<LiveSettings>>);

impl SharedSettings {
    pub fn new(settings: LiveSettings) -> Self {
        SharedSettings(Arc::new(Mutex::new(settings)))
    }

    pub fn lock(&self) -> MutexGuard<'_, LiveSettings> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn loot_mode(&self) -> LootMode {
        self.lock().loot_mode
    }

    pub fn set_loot_mode(&self, mode: LootMode) {
        self.lock().loot_mode = mode;
    }

    pub fn set_profiles(&self, profiles: Vec<TargetProfile>) {
        self.lock().profiles = profiles;
    }

    /// Clone of the profile matching `name`
    pub fn profile_for(&self, name: &str) -> Option<TargetProfile> {
        match_profile(&self.lock().profiles, name).cloned()
    }

    pub fn profiles(&self) -> Vec<TargetProfile> {
        self.lock().profiles.clone()
    }
}
