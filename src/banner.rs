use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

pub mod fetch;

pub const UNAVAILABLE: &str = "unavailable";

#[derive(Debug, Clone, Deserialize)]
pub struct BannerDocument {
    pub title: String,
    pub missions: NumberedMap<Mission>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mission {
    pub steps: NumberedMap<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub poi: Poi,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Poi {
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Poi {
    pub fn is_available(&self) -> bool {
        self.ty.as_deref() != Some(UNAVAILABLE)
    }
}

/// A JSON object keyed by decimal strings (`"1"`, `"10"`, ...).
///
/// Keys are parsed while decoding and kept next to their value in document
/// order. Nothing here sorts; callers order by the numeric key.
/// Keys that are not unsigned integers, or that collide once parsed
/// (`"01"` vs `"1"`), fail the decode.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedMap<T>(Vec<(u64, T)>);

impl<T> NumberedMap<T> {
    pub fn entries(&self) -> &[(u64, T)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct NumberedMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for NumberedMapVisitor<T> {
    type Value = NumberedMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map keyed by unsigned integer strings")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((raw, value)) = map.next_entry::<String, T>()? {
            let key: u64 = raw
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("key {:?} is not a number", raw)))?;
            if !seen.insert(key) {
                return Err(de::Error::custom(format!(
                    "key {:?} duplicates numeric key {}",
                    raw, key
                )));
            }
            entries.push((key, value));
        }
        Ok(NumberedMap(entries))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for NumberedMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(NumberedMapVisitor(PhantomData))
    }
}
