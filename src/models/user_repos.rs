use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageStat {
    pub name: String,
    pub size: u64,
    pub percentage: f64,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformedRepository {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub language: Option<String>,
    pub languages: LanguageSizes,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReposResponse {
    pub title: String,
    pub username: String,
    pub repositories: Vec<TransformedRepository>,
    pub language_stats: Vec<LanguageStat>,
}

/// Language name to byte size, serialized as a JSON object in the order
/// GitHub returned the languages (largest first).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageSizes(Vec<(String, u64)>);

impl LanguageSizes {
    // A repeated name keeps its first position and takes the later size.
    pub fn insert(&mut self, name: String, size: u64) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = size,
            None => self.0.push((name, size)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&u64> {
        self.0.iter().find(|(existing, _)| existing == name).map(|(_, size)| size)
    }
}

impl Serialize for LanguageSizes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, size) in &self.0 {
            map.serialize_entry(name, size)?;
        }
        map.end()
    }
}
