//! Participant data structure.

use serde::{Deserialize, Serialize};

/// Opaque participant identifier handed over by the caller (e.g. a chat user id).
pub type ParticipantId = String;

/// A registered participant. Frozen once the tournament starts.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Avatar reference; carried along for display, never read by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// Roster as stored in the tournament record: participant id to `{name, avatar?}`, kept
/// in registration order.
pub(crate) mod roster_map {
    use super::Participant;
    use serde::de::{self, MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    #[derive(Serialize)]
    struct EntryRef<'a> {
        name: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        avatar: Option<&'a str>,
    }

    #[derive(Deserialize)]
    struct Entry {
        name: String,
        #[serde(default)]
        avatar: Option<String>,
    }

    pub fn serialize<S>(roster: &[Participant], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(roster.len()))?;
        for p in roster {
            let entry = EntryRef {
                name: &p.name,
                avatar: p.avatar.as_deref(),
            };
            map.serialize_entry(&p.id, &entry)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Participant>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RosterVisitor)
    }

    struct RosterVisitor;

    impl<'de> Visitor<'de> for RosterVisitor {
        type Value = Vec<Participant>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of participant id to {name}")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut roster: Vec<Participant> = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((id, entry)) = access.next_entry::<String, Entry>()? {
                if roster.iter().any(|p| p.id == id) {
                    return Err(de::Error::custom(format!("duplicate participant id {id}")));
                }
                roster.push(Participant {
                    id,
                    name: entry.name,
                    avatar: entry.avatar,
                });
            }
            Ok(roster)
        }
    }
}
