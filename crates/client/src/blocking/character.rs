use miniapp_core::{BlueprintPatch, CharacterItem};
use serde_json::Value;
use tracing::debug;

use super::BlockingTransport;
use crate::error::Error;
use crate::wire;

/// Blocking character blueprint resource.
#[derive(Clone, Copy)]
pub struct CharacterResource<'a> {
    transport: &'a dyn BlockingTransport,
}

impl<'a> CharacterResource<'a> {
    pub fn new(transport: &'a dyn BlockingTransport) -> Self {
        Self { transport }
    }

    /// See [`crate::CharacterResource::get_blueprint`].
    pub fn get_blueprint(&self, character_id: &str) -> Result<CharacterItem, Error> {
        let body = wire::blueprint_body(character_id)?;
        let payload = self.transport.post(wire::CHARACTER_BLUEPRINT, &body)?;
        wire::parse_character(payload)
    }

    /// See [`crate::CharacterResource::upsert_blueprint_state`].
    pub fn upsert_blueprint_state(
        &self,
        character_id: &str,
        patch: impl Into<BlueprintPatch>,
    ) -> Result<CharacterItem, Error> {
        let patch = patch.into();
        debug!(character_id, sections = ?patch.keys().collect::<Vec<_>>(), "upserting blueprint state");
        let body = Value::Object(patch.into_body(character_id));
        let payload = self.transport.post(wire::CHARACTER_BLUEPRINT_STATE, &body)?;
        wire::parse_character(payload)
    }
}
