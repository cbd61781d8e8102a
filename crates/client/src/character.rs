//! Character blueprint operations.

use miniapp_core::{BlueprintPatch, CharacterItem};
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::transport::Transport;
use crate::wire;

/// Character blueprint resource.
///
/// Obtained from [`MiniAppClient::character`](crate::MiniAppClient::character).
#[derive(Clone, Copy)]
pub struct CharacterResource<'a> {
    transport: &'a dyn Transport,
}

impl<'a> CharacterResource<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Get the full character (profile and blueprint state) by ID.
    ///
    /// Fails with [`ApiError::NotFound`](crate::ApiError::NotFound) if the
    /// character does not exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), miniapp_client::Error> {
    /// use miniapp_client::MiniAppClient;
    ///
    /// let client = MiniAppClient::builder("ma_xxx").base_url("https://api.example").build()?;
    /// let character = client.character().get_blueprint("char-uuid").await?;
    /// println!("{}", character.profile.profile_name);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_blueprint(&self, character_id: &str) -> Result<CharacterItem, Error> {
        let body = wire::blueprint_body(character_id)?;
        let payload = self
            .transport
            .post(wire::CHARACTER_BLUEPRINT, &body)
            .await?;
        wire::parse_character(payload)
    }

    /// Partially update the blueprint state.
    ///
    /// Only the sections in `patch` are sent. Each replaces the stored
    /// section wholesale; a cleared section deletes it. Returns the
    /// character as the service now holds it.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), miniapp_client::Error> {
    /// use miniapp_client::MiniAppClient;
    /// use miniapp_core::{BlueprintPatch, BlueprintSection};
    ///
    /// let client = MiniAppClient::builder("ma_xxx").base_url("https://api.example").build()?;
    /// let patch = BlueprintPatch::new()
    ///     .set(BlueprintSection::Goal, serde_json::json!({"primary": "find the lighthouse"}));
    /// let updated = client.character().upsert_blueprint_state("char-uuid", patch).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upsert_blueprint_state(
        &self,
        character_id: &str,
        patch: impl Into<BlueprintPatch>,
    ) -> Result<CharacterItem, Error> {
        let patch = patch.into();
        debug!(character_id, sections = ?patch.keys().collect::<Vec<_>>(), "upserting blueprint state");
        let body = Value::Object(patch.into_body(character_id));
        let payload = self
            .transport
            .post(wire::CHARACTER_BLUEPRINT_STATE, &body)
            .await?;
        wire::parse_character(payload)
    }
}
