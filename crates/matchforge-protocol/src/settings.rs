//! The room settings record: one consistent snapshot of a lobby's
//! configurable state.
//!
//! This is a pure value type. The owning lobby mutates a copy field by
//! field, then transmits it as an atomic unit; recipients replace
//! their entire local copy on receipt. There is no partial-field merge
//! anywhere, and change detection is structural equality (`==`), never
//! identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{MatchType, Mod};
use crate::wire::{ByteReader, ByteWriter, WireDecode, WireEncode};
use crate::ProtocolError;

/// Permanent wire indices for [`RoomSettings`] fields.
///
/// Once an index has shipped bound to a field, that binding never
/// changes and the index is never reused — evolution is additive only
/// (new fields get new indices). Keep this table in sync with the
/// encode/decode arms below; the round-trip tests pin it down.
pub mod field_index {
    pub const BEATMAP_ID: u8 = 0;
    pub const RULESET_ID: u8 = 1;
    pub const BEATMAP_CHECKSUM: u8 = 2;
    pub const NAME: u8 = 3;
    pub const REQUIRED_MODS: u8 = 4;
    pub const ALLOWED_MODS: u8 = 5;
    pub const PLAYLIST_ITEM_ID: u8 = 6;
    pub const PASSWORD: u8 = 7;
    pub const MATCH_TYPE: u8 = 8;

    /// Size of the shipped baseline. Indices below this are required
    /// on decode; indices at or above it belong to future versions and
    /// are skipped.
    pub const BASELINE: u8 = 9;
}

/// The configurable state of a multiplayer lobby.
///
/// Equality is the change-detection contract: a host that receives a
/// candidate settings record compares it with `==` and only
/// broadcasts an update when they differ. The derived `PartialEq` is
/// exactly the required law — byte-exact string comparison and
/// element-for-element, order-sensitive mod list comparison. `Eq` is
/// not derived because mod parameters may carry floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSettings {
    /// Identifies the selected beatmap.
    pub beatmap_id: i32,

    /// Identifies the scoring ruleset.
    pub ruleset_id: i32,

    /// Content-integrity hash of the selected beatmap.
    pub beatmap_checksum: String,

    /// Display name of the room.
    pub name: String,

    /// Mods every player must have active. Order-sensitive: no
    /// implicit sorting or deduplication is performed.
    pub required_mods: Vec<Mod>,

    /// Mods players may optionally enable. Order-sensitive, like
    /// `required_mods`.
    pub allowed_mods: Vec<Mod>,

    /// Identifies the active playlist entry.
    pub playlist_item_id: i64,

    /// Plaintext room password; empty means no password. Diagnostics
    /// only ever render its presence, never the value.
    pub password: String,

    /// The competitive structure of the room.
    pub match_type: MatchType,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            beatmap_id: 0,
            ruleset_id: 0,
            beatmap_checksum: String::new(),
            name: "Unnamed room".to_owned(),
            required_mods: Vec::new(),
            allowed_mods: Vec::new(),
            playlist_item_id: 0,
            password: String::new(),
            match_type: MatchType::HeadToHead,
        }
    }
}

impl RoomSettings {
    /// Encodes the record to its wire form.
    ///
    /// Never fails: every field always holds an encodable value.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        self.encode(&mut w);
        w.into_bytes()
    }

    /// Decodes a record from its wire form.
    ///
    /// Fails fast: no partially decoded record is ever returned. The
    /// caller keeps its previously accepted settings on error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ByteReader::new(bytes);
        let settings = Self::decode(&mut r)?;
        if !r.is_empty() {
            return Err(ProtocolError::malformed(format!(
                "{} trailing bytes after settings record",
                r.remaining()
            )));
        }
        Ok(settings)
    }
}

impl WireEncode for RoomSettings {
    /// Writes every baseline field as an `(index, tagged value)` entry
    /// in ascending index order, prefixed with the entry count.
    fn encode(&self, w: &mut ByteWriter) {
        w.put_u8(field_index::BASELINE);

        w.put_u8(field_index::BEATMAP_ID);
        w.put_i32(self.beatmap_id);

        w.put_u8(field_index::RULESET_ID);
        w.put_i32(self.ruleset_id);

        w.put_u8(field_index::BEATMAP_CHECKSUM);
        w.put_str(&self.beatmap_checksum);

        w.put_u8(field_index::NAME);
        w.put_str(&self.name);

        w.put_u8(field_index::REQUIRED_MODS);
        w.put_list(&self.required_mods);

        w.put_u8(field_index::ALLOWED_MODS);
        w.put_list(&self.allowed_mods);

        w.put_u8(field_index::PLAYLIST_ITEM_ID);
        w.put_i64(self.playlist_item_id);

        w.put_u8(field_index::PASSWORD);
        w.put_str(&self.password);

        w.put_u8(field_index::MATCH_TYPE);
        self.match_type.encode(w);
    }
}

impl WireDecode for RoomSettings {
    /// Reads entries in any order, keyed by wire index.
    ///
    /// - unknown indices (future fields) are skipped, and their
    ///   would-be fields keep their defaults in this build;
    /// - a baseline index that never appears is `MalformedData`;
    /// - so is a duplicated index or a type-tag mismatch;
    /// - an unknown `MatchType` ordinal is `UnknownVariant`.
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, ProtocolError> {
        let entries = r.get_u8()?;
        let mut seen = [false; field_index::BASELINE as usize];
        let mut settings = Self::default();

        for _ in 0..entries {
            let index = r.get_u8()?;
            if index >= field_index::BASELINE {
                r.skip_value()?;
                continue;
            }
            if std::mem::replace(&mut seen[index as usize], true) {
                return Err(ProtocolError::malformed(format!(
                    "duplicate field index {index}"
                )));
            }
            match index {
                field_index::BEATMAP_ID => {
                    settings.beatmap_id = r.get_i32("beatmap_id")?;
                }
                field_index::RULESET_ID => {
                    settings.ruleset_id = r.get_i32("ruleset_id")?;
                }
                field_index::BEATMAP_CHECKSUM => {
                    settings.beatmap_checksum = r.get_str("beatmap_checksum")?;
                }
                field_index::NAME => {
                    settings.name = r.get_str("name")?;
                }
                field_index::REQUIRED_MODS => {
                    settings.required_mods = r.get_list("required_mods")?;
                }
                field_index::ALLOWED_MODS => {
                    settings.allowed_mods = r.get_list("allowed_mods")?;
                }
                field_index::PLAYLIST_ITEM_ID => {
                    settings.playlist_item_id = r.get_i64("playlist_item_id")?;
                }
                field_index::PASSWORD => {
                    settings.password = r.get_str("password")?;
                }
                field_index::MATCH_TYPE => {
                    settings.match_type = MatchType::decode(r)?;
                }
                _ => unreachable!("index checked against BASELINE above"),
            }
        }

        for (index, present) in seen.iter().enumerate() {
            if !present {
                return Err(ProtocolError::malformed(format!(
                    "missing required field index {index}"
                )));
            }
        }

        Ok(settings)
    }
}

fn join_mods(mods: &[Mod]) -> String {
    mods.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Diagnostic rendering for logs and debugging.
///
/// Field order is fixed, but this is not a serialization format and
/// is not byte-stable across versions. The password is rendered as
/// presence only ("yes"/"no") so it never leaks into logs.
impl fmt::Display for RoomSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name:{} Beatmap:{} ({}) RequiredMods:{} AllowedMods:{} Password:{} Ruleset:{} Type:{} Item:{}",
            self.name,
            self.beatmap_id,
            self.beatmap_checksum,
            join_mods(&self.required_mods),
            join_mods(&self.allowed_mods),
            if self.password.is_empty() { "no" } else { "yes" },
            self.ruleset_id,
            self.match_type,
            self.playlist_item_id,
        )
    }
}

// =========================================================================
// Tests
// =========================================================================
