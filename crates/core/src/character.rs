use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;

/// Appearance and personal details shown on a character's profile.
///
/// Every field is independently optional; an absent field means the value
/// is unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityCard {
    // Appearance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phenotype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hair: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hair_style: Option<String>,
    /// Eye description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocular_scan: Option<String>,

    // Identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zodiac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_tags: Option<Vec<String>>,

    // Style
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A character's public profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    /// Character identifier.
    pub id: String,
    /// Identifier of the owning user.
    pub user_id: String,
    /// Display name.
    pub profile_name: String,
    /// Handle.
    pub username: String,
    /// Avatar image URL.
    pub avatar: String,
    /// Appearance and personal details. Always present on a returned profile.
    pub identity_card: IdentityCard,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub posts_count: u64,
    /// Voice sample URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_url: Option<String>,
    /// Social platform name to handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handles: Option<BTreeMap<String, Value>>,
}

impl CharacterProfile {
    /// Look up the handle registered for a social platform.
    ///
    /// Returns `None` if the platform is missing or its value is not a string.
    pub fn handle(&self, platform: &str) -> Option<&str> {
        self.handles.as_ref()?.get(platform)?.as_str()
    }
}

/// Named top-level sections of a blueprint state document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlueprintSection {
    CorePersonality,
    ExpressionEngine,
    AestheticEngine,
    Simulation,
    Goal,
    Backstory,
    OnboardingInput,
    Prototype,
}

impl BlueprintSection {
    /// All sections, in document order.
    pub const ALL: [Self; 8] = [
        Self::CorePersonality,
        Self::ExpressionEngine,
        Self::AestheticEngine,
        Self::Simulation,
        Self::Goal,
        Self::Backstory,
        Self::OnboardingInput,
        Self::Prototype,
    ];

    /// The camelCase key used on the wire.
    pub fn wire_key(self) -> &'static str {
        match self {
            Self::CorePersonality => "corePersonality",
            Self::ExpressionEngine => "expressionEngine",
            Self::AestheticEngine => "aestheticEngine",
            Self::Simulation => "simulation",
            Self::Goal => "goal",
            Self::Backstory => "backstory",
            Self::OnboardingInput => "onboardingInput",
            Self::Prototype => "prototype",
        }
    }

    /// The snake_case name used in Rust code and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::CorePersonality => "core_personality",
            Self::ExpressionEngine => "expression_engine",
            Self::AestheticEngine => "aesthetic_engine",
            Self::Simulation => "simulation",
            Self::Goal => "goal",
            Self::Backstory => "backstory",
            Self::OnboardingInput => "onboarding_input",
            Self::Prototype => "prototype",
        }
    }
}

impl fmt::Display for BlueprintSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlueprintSection {
    type Err = ModelError;

    /// Accepts either the snake_case name or the camelCase wire key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.name() == s || section.wire_key() == s)
            .ok_or_else(|| ModelError::UnknownSection(s.to_owned()))
    }
}

/// A character's internal blueprint (AI personality data).
///
/// Section contents are opaque structured data; the client does not
/// validate them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_personality: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_engine: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aesthetic_engine: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backstory: Option<Value>,
    /// When `backstory` was last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backstory_updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototype: Option<Value>,
}

impl BlueprintState {
    /// Borrow the contents of a section, if present and non-null.
    pub fn section(&self, section: BlueprintSection) -> Option<&Value> {
        let value = match section {
            BlueprintSection::CorePersonality => &self.core_personality,
            BlueprintSection::ExpressionEngine => &self.expression_engine,
            BlueprintSection::AestheticEngine => &self.aesthetic_engine,
            BlueprintSection::Simulation => &self.simulation,
            BlueprintSection::Goal => &self.goal,
            BlueprintSection::Backstory => &self.backstory,
            BlueprintSection::OnboardingInput => &self.onboarding_input,
            BlueprintSection::Prototype => &self.prototype,
        };
        value.as_ref().filter(|v| !v.is_null())
    }
}

/// Full character data: profile plus optional blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterItem {
    pub id: String,
    pub profile: CharacterProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint: Option<BlueprintState>,
}

/// A partial blueprint update.
///
/// Only the sections recorded in the patch are sent. Each one replaces the
/// stored section wholesale; a cleared section is sent as an explicit
/// `null`, which the service treats as a delete. Sections never mentioned
/// are left untouched server-side.
///
/// ```
/// use miniapp_core::{BlueprintPatch, BlueprintSection};
///
/// let patch = BlueprintPatch::new()
///     .set(BlueprintSection::Goal, serde_json::json!({"primary": "explore"}))
///     .clear(BlueprintSection::Backstory);
///
/// let body = serde_json::to_value(&patch).unwrap();
/// assert_eq!(body["backstory"], serde_json::Value::Null);
/// assert!(body.get("simulation").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BlueprintPatch {
    entries: Map<String, Value>,
}

impl BlueprintPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a section with the given value.
    #[must_use]
    pub fn set(mut self, section: BlueprintSection, value: Value) -> Self {
        self.entries.insert(section.wire_key().to_owned(), value);
        self
    }

    /// Delete a section server-side.
    #[must_use]
    pub fn clear(mut self, section: BlueprintSection) -> Self {
        self.entries
            .insert(section.wire_key().to_owned(), Value::Null);
        self
    }

    /// Set the backstory timestamp alongside a backstory update.
    #[must_use]
    pub fn backstory_updated_at(mut self, millis: i64) -> Self {
        self.entries
            .insert("backstoryUpdatedAt".to_owned(), Value::from(millis));
        self
    }

    /// Whether the patch would change anything.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys this patch will send, in wire form.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Build the request body: the patched sections plus the character id.
    ///
    /// The id is written last so a stray `characterId` entry can never
    /// redirect the update.
    pub fn into_body(self, character_id: &str) -> Map<String, Value> {
        let mut body = self.entries;
        body.insert(
            "characterId".to_owned(),
            Value::String(character_id.to_owned()),
        );
        body
    }
}

impl From<&BlueprintState> for BlueprintPatch {
    /// Every section present in `state` becomes a replacement; absent
    /// sections are omitted rather than cleared.
    fn from(state: &BlueprintState) -> Self {
        let mut patch = Self::new();
        for section in BlueprintSection::ALL {
            if let Some(value) = state.section(section) {
                patch = patch.set(section, value.clone());
            }
        }
        if let Some(ts) = state.backstory_updated_at {
            patch = patch.backstory_updated_at(ts);
        }
        patch
    }
}

impl From<BlueprintState> for BlueprintPatch {
    fn from(state: BlueprintState) -> Self {
        Self::from(&state)
    }
}
