//! Domain types that appear inside the room settings record.
//!
//! Serde derives give these a JSON representation for diagnostics and
//! external tooling; the authoritative interchange encoding is the
//! binary wire format in [`crate::wire`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::wire::{ByteReader, ByteWriter, Tag, WireDecode, WireEncode};
use crate::ProtocolError;

// ---------------------------------------------------------------------------
// RoomId
// ---------------------------------------------------------------------------

/// A unique identifier for a room.
///
/// Newtype over `u64` so a room id can't be confused with any other
/// numeric id at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MatchType
// ---------------------------------------------------------------------------

/// The competitive structure of a room.
///
/// This is a closed set: downstream logic dispatches on it
/// exhaustively, so a wire ordinal outside the known variants is
/// rejected with [`ProtocolError::UnknownVariant`] rather than mapped
/// to some fallback mode (which would misrepresent the room).
///
/// Wire ordinals are permanent; new variants get new ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchType {
    /// Free-for-all: every player competes individually.
    #[default]
    HeadToHead,
    /// Players are split into competing teams.
    TeamVersus,
}

impl MatchType {
    /// The permanent wire ordinal for this variant.
    pub fn ordinal(self) -> u8 {
        match self {
            Self::HeadToHead => 0,
            Self::TeamVersus => 1,
        }
    }

    /// Maps a wire ordinal back onto a variant.
    pub fn from_ordinal(tag: u8) -> Result<Self, ProtocolError> {
        match tag {
            0 => Ok(Self::HeadToHead),
            1 => Ok(Self::TeamVersus),
            tag => Err(ProtocolError::UnknownVariant {
                kind: "MatchType",
                tag,
            }),
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeadToHead => write!(f, "HeadToHead"),
            Self::TeamVersus => write!(f, "TeamVersus"),
        }
    }
}

impl WireEncode for MatchType {
    fn encode(&self, w: &mut ByteWriter) {
        w.put_ordinal(self.ordinal());
    }
}

impl WireDecode for MatchType {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, ProtocolError> {
        Self::from_ordinal(r.get_ordinal("match_type")?)
    }
}

// ---------------------------------------------------------------------------
// ModValue
// ---------------------------------------------------------------------------

/// A single mod parameter value.
///
/// Parameters are heterogeneous (a rate multiplier is a float, a
/// toggle is a bool), so the value carries its own wire tag and
/// dispatches on it when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl WireEncode for ModValue {
    fn encode(&self, w: &mut ByteWriter) {
        match self {
            Self::Bool(v) => w.put_bool(*v),
            Self::Int(v) => w.put_i64(*v),
            Self::Float(v) => w.put_f64(*v),
            Self::Text(v) => w.put_str(v),
        }
    }
}

impl WireDecode for ModValue {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, ProtocolError> {
        match r.peek_tag()? {
            Tag::Bool => Ok(Self::Bool(r.get_bool("mod value")?)),
            Tag::I64 => Ok(Self::Int(r.get_i64("mod value")?)),
            Tag::F64 => Ok(Self::Float(r.get_f64("mod value")?)),
            Tag::Str => Ok(Self::Text(r.get_str("mod value")?)),
            other => Err(ProtocolError::malformed(format!(
                "mod value cannot be of type {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ModParam
// ---------------------------------------------------------------------------

/// A named mod parameter, e.g. `speed_change = 1.5` on a rate mod.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModParam {
    pub name: String,
    pub value: ModValue,
}

impl WireEncode for ModParam {
    fn encode(&self, w: &mut ByteWriter) {
        w.begin_record(2);
        w.put_str(&self.name);
        self.value.encode(w);
    }
}

impl WireDecode for ModParam {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, ProtocolError> {
        let fields = r.expect_record("mod param")?;
        if fields < 2 {
            return Err(ProtocolError::malformed(format!(
                "mod param record has {fields} fields, expected at least 2"
            )));
        }
        let name = r.get_str("mod param name")?;
        let value = ModValue::decode(r)?;
        // Fields appended by newer versions.
        for _ in 2..fields {
            r.skip_value()?;
        }
        Ok(Self { name, value })
    }
}

// ---------------------------------------------------------------------------
// Mod
// ---------------------------------------------------------------------------

/// A gameplay modifier: a canonical acronym plus its parameter payload.
///
/// Equality is structural over the acronym and the *ordered* parameter
/// list. Mods are validated upstream; this type carries no knowledge
/// of which acronyms exist or what parameters they accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mod {
    /// Canonical short identifier, e.g. `"DT"` or `"HD"`.
    pub acronym: String,
    /// Mod-specific parameters, order preserved.
    pub params: Vec<ModParam>,
}

impl Mod {
    /// A mod with no parameters.
    pub fn new(acronym: impl Into<String>) -> Self {
        Self {
            acronym: acronym.into(),
            params: Vec::new(),
        }
    }

    /// Appends a parameter, keeping insertion order.
    pub fn with_param(mut self, name: impl Into<String>, value: ModValue) -> Self {
        self.params.push(ModParam {
            name: name.into(),
            value,
        });
        self
    }
}

/// Renders the canonical mod token used in comma-joined mod lists.
impl fmt::Display for Mod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.acronym)
    }
}

impl WireEncode for Mod {
    fn encode(&self, w: &mut ByteWriter) {
        w.begin_record(2);
        w.put_str(&self.acronym);
        w.put_list(&self.params);
    }
}

impl WireDecode for Mod {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, ProtocolError> {
        let fields = r.expect_record("mod")?;
        if fields < 2 {
            return Err(ProtocolError::malformed(format!(
                "mod record has {fields} fields, expected at least 2"
            )));
        }
        let acronym = r.get_str("mod acronym")?;
        let params = r.get_list("mod params")?;
        for _ in 2..fields {
            r.skip_value()?;
        }
        Ok(Self { acronym, params })
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{ByteReader, ByteWriter};

    fn round_trip<T: WireEncode + WireDecode>(value: &T) -> T {
        let mut w = ByteWriter::new();
        value.encode(&mut w);
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        let decoded = T::decode(&mut r).expect("decode failed");
        assert!(r.is_empty(), "decode left trailing bytes");
        decoded
    }

    #[test]
    fn test_match_type_default_is_head_to_head() {
        assert_eq!(MatchType::default(), MatchType::HeadToHead);
    }

    #[test]
    fn test_match_type_ordinals_are_stable() {
        // Wire contract: these values are permanent.
        assert_eq!(MatchType::HeadToHead.ordinal(), 0);
        assert_eq!(MatchType::TeamVersus.ordinal(), 1);
    }

    #[test]
    fn test_match_type_round_trip() {
        assert_eq!(round_trip(&MatchType::HeadToHead), MatchType::HeadToHead);
        assert_eq!(round_trip(&MatchType::TeamVersus), MatchType::TeamVersus);
    }

    #[test]
    fn test_match_type_unknown_ordinal_is_rejected() {
        let err = MatchType::from_ordinal(9).unwrap_err();
        match err {
            ProtocolError::UnknownVariant { kind, tag } => {
                assert_eq!(kind, "MatchType");
                assert_eq!(tag, 9);
            }
            other => panic!("expected UnknownVariant, got {other:?}"),
        }
    }

    #[test]
    fn test_mod_display_is_the_acronym() {
        let dt = Mod::new("DT").with_param("speed_change", ModValue::Float(1.5));
        assert_eq!(dt.to_string(), "DT");
    }

    #[test]
    fn test_mod_round_trip_with_params() {
        let m = Mod::new("DA")
            .with_param("circle_size", ModValue::Float(4.0))
            .with_param("hard_rock_offsets", ModValue::Bool(true))
            .with_param("extended_limits", ModValue::Int(2))
            .with_param("note", ModValue::Text("custom".into()));
        assert_eq!(round_trip(&m), m);
    }

    #[test]
    fn test_mod_round_trip_without_params() {
        let m = Mod::new("HD");
        assert_eq!(round_trip(&m), m);
    }

    #[test]
    fn test_mod_equality_is_structural() {
        let a = Mod::new("DT").with_param("speed_change", ModValue::Float(1.5));
        let b = Mod::new("DT").with_param("speed_change", ModValue::Float(1.5));
        let c = Mod::new("DT").with_param("speed_change", ModValue::Float(2.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_mod_param_order_affects_equality() {
        let a = Mod::new("DA")
            .with_param("x", ModValue::Int(1))
            .with_param("y", ModValue::Int(2));
        let b = Mod::new("DA")
            .with_param("y", ModValue::Int(2))
            .with_param("x", ModValue::Int(1));
        assert_ne!(a, b);
    }

    #[test]
    fn test_mod_decode_skips_future_record_fields() {
        // A mod record written by a hypothetical newer version with a
        // third field; this build must decode the two it knows and
        // skip the rest.
        let mut w = ByteWriter::new();
        w.begin_record(3);
        w.put_str("DT");
        w.begin_list(0);
        w.put_bool(true); // future field

        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        let m = Mod::decode(&mut r).unwrap();
        assert_eq!(m, Mod::new("DT"));
        assert!(r.is_empty());
    }

    #[test]
    fn test_mod_value_wrong_tag_is_malformed() {
        // An I32 where a mod value is expected (mod values are never I32).
        let mut w = ByteWriter::new();
        w.put_i32(5);
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        assert!(matches!(
            ModValue::decode(&mut r),
            Err(ProtocolError::MalformedData(_))
        ));
    }

    #[test]
    fn test_match_type_json_shape() {
        // Serde derive: plain variant name as a JSON string.
        let json = serde_json::to_string(&MatchType::TeamVersus).unwrap();
        assert_eq!(json, "\"TeamVersus\"");
    }

    #[test]
    fn test_mod_json_round_trip() {
        let m = Mod::new("DT").with_param("speed_change", ModValue::Float(1.5));
        let json = serde_json::to_string(&m).unwrap();
        let back: Mod = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
