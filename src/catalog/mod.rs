// Group catalog: builtin roster merged with the optional generated data file.

pub mod builtin;
pub mod source;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

use self::builtin::BUILTIN_GROUPS;
use self::source::RawGroup;

/// Errors raised while reading a group data file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read group file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed group file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A named collection of members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Normalized key (see [`norm_group_key`]).
    pub key: String,
    /// Human-readable name shown to players.
    pub display_name: String,
    /// Members in display order.
    pub members: Vec<String>,
}

impl Group {
    pub fn new(key: &str, display_name: &str, members: &[&str]) -> Self {
        Self {
            key: norm_group_key(key),
            display_name: display_name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Read-only catalog shared by every session.
#[derive(Debug, Clone, Default)]
pub struct GroupCatalog {
    builtin: Vec<Group>,
    ai: Vec<Group>,
    all: Vec<Group>,
}

impl GroupCatalog {
    /// Build a catalog from explicit builtin groups and raw generated groups.
    ///
    /// Generated group names are normalized into keys and keep their original spelling
    /// as display name. In the merged view a generated group replaces the member list
    /// of a builtin group with the same key, but the builtin display name is kept.
    pub fn new(builtin: Vec<Group>, generated: Vec<RawGroup>) -> Self {
        let mut ai: Vec<Group> = Vec::new();
        for raw in generated {
            let key = norm_group_key(&raw.name);
            if key.is_empty() {
                continue;
            }
            let group = Group {
                key,
                display_name: raw.name.trim().to_string(),
                members: raw.members,
            };
            match ai.iter_mut().find(|g| g.key == group.key) {
                Some(existing) => *existing = group,
                None => ai.push(group),
            }
        }

        let mut all = builtin.clone();
        for group in &ai {
            match all.iter_mut().find(|g| g.key == group.key) {
                Some(existing) => existing.members = group.members.clone(),
                None => all.push(group.clone()),
            }
        }

        Self { builtin, ai, all }
    }

    /// The builtin roster plus whatever `generated` contributes.
    pub fn with_builtin(generated: Vec<RawGroup>) -> Self {
        let builtin = BUILTIN_GROUPS
            .iter()
            .map(|(key, name, members)| Group::new(key, name, members))
            .collect();
        Self::new(builtin, generated)
    }

    /// Load the builtin roster and the generated data file at `ai_path`.
    /// An unreadable or malformed file is logged and treated as absent.
    pub fn load(ai_path: &Path) -> Self {
        let generated = match source::load_group_file(ai_path) {
            Ok(groups) => groups,
            Err(e) => {
                tracing::warn!("Ignoring generated group data: {e}");
                Vec::new()
            }
        };
        let catalog = Self::with_builtin(generated);
        tracing::info!(
            builtin = catalog.builtin.len(),
            generated = catalog.ai.len(),
            "Group catalog loaded"
        );
        catalog
    }

    /// Groups used by the basic quiz.
    pub fn builtin(&self) -> &[Group] {
        &self.builtin
    }

    /// Groups from the generated data file (empty when unavailable).
    pub fn ai(&self) -> &[Group] {
        &self.ai
    }

    /// Merged view used for browsing, learning, photos and lookups.
    pub fn all(&self) -> &[Group] {
        &self.all
    }

    pub fn group(&self, key: &str) -> Option<&Group> {
        self.all.iter().find(|g| g.key == key)
    }

    /// Display name for `key`, or the key itself when unknown.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.group(key).map(|g| g.display_name.as_str()).unwrap_or(key)
    }

    /// Find the first group containing a member typed by the player.
    /// The input is title-cased before the lookup, so "jennie" finds "Jennie".
    pub fn find_member(&self, text: &str) -> Option<(String, &Group)> {
        let name = title_case(text.trim());
        self.all
            .iter()
            .find(|g| g.members.iter().any(|m| *m == name))
            .map(|g| (name, g))
    }
}

/// Normalize a group name: lowercase, trim and collapse inner whitespace.
pub fn norm_group_key(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Uppercase the first letter of every word and lowercase the rest.
/// Any non-letter starts a new word ("jeong-yeon" becomes "Jeong-Yeon").
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Accepted answer spellings -> group key.
///
/// Each group contributes its key and display name, both lowercased, plus a
/// variant of each with spaces removed.
pub fn alias_lookup(groups: &[Group]) -> HashMap<String, String> {
    let mut aliases = HashMap::new();
    for group in groups {
        for spelling in [norm_group_key(&group.key), norm_group_key(&group.display_name)] {
            aliases.insert(spelling.replace(' ', ""), group.key.clone());
            aliases.insert(spelling, group.key.clone());
        }
    }
    aliases
}

/// Lowercased member name -> keys of every group containing that name.
pub fn member_groups(groups: &[Group]) -> HashMap<String, HashSet<String>> {
    let mut map: HashMap<String, HashSet<String>> = HashMap::new();
    for group in groups {
        for member in &group.members {
            map.entry(member.to_lowercase())
                .or_default()
                .insert(group.key.clone());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, members: &[&str]) -> RawGroup {
        RawGroup {
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn test_norm_group_key() {
        assert_eq!(norm_group_key("  Red   Velvet "), "red velvet");
        assert_eq!(norm_group_key("BLACKPINK"), "blackpink");
        assert_eq!(norm_group_key("Red\tVelvet"), "red velvet");
        assert_eq!(norm_group_key(""), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("jennie"), "Jennie");
        assert_eq!(title_case("JISOO"), "Jisoo");
        assert_eq!(title_case("bang chan"), "Bang Chan");
        assert_eq!(title_case("jeong-yeon"), "Jeong-Yeon");
    }

    #[test]
    fn test_alias_lookup_spellings() {
        let groups = vec![Group::new("red velvet", "Red Velvet", &["Joy"])];
        let aliases = alias_lookup(&groups);
        assert_eq!(aliases.get("red velvet").map(String::as_str), Some("red velvet"));
        assert_eq!(aliases.get("redvelvet").map(String::as_str), Some("red velvet"));
        assert!(aliases.get("red").is_none());
    }

    #[test]
    fn test_member_groups_tracks_duplicates() {
        let groups = vec![
            Group::new("a", "A", &["Sam"]),
            Group::new("b", "B", &["sam", "Kim"]),
        ];
        let map = member_groups(&groups);
        let sam = map.get("sam").unwrap();
        assert_eq!(sam.len(), 2);
        assert!(sam.contains("a") && sam.contains("b"));
        assert_eq!(map.get("kim").unwrap().len(), 1);
    }

    #[test]
    fn test_generated_groups_are_normalized() {
        let catalog = GroupCatalog::new(vec![], vec![raw("Stray  Kids", &["Felix"])]);
        assert_eq!(catalog.ai().len(), 1);
        assert_eq!(catalog.ai()[0].key, "stray kids");
        assert_eq!(catalog.ai()[0].display_name, "Stray  Kids");
        assert_eq!(catalog.all().len(), 1);
    }

    #[test]
    fn test_merge_keeps_builtin_display_name() {
        let builtin = vec![Group::new("aespa", "Aespa", &["Karina"])];
        let catalog = GroupCatalog::new(builtin, vec![raw("AESPA", &["Karina", "Winter"])]);
        let merged = catalog.group("aespa").unwrap();
        assert_eq!(merged.display_name, "Aespa");
        assert_eq!(merged.members, vec!["Karina", "Winter"]);
        // The builtin view is untouched.
        assert_eq!(catalog.builtin()[0].members, vec!["Karina"]);
        assert_eq!(catalog.ai()[0].display_name, "AESPA");
    }

    #[test]
    fn test_builtin_catalog_without_generated_data() {
        let catalog = GroupCatalog::with_builtin(vec![]);
        assert!(catalog.ai().is_empty());
        assert_eq!(catalog.builtin().len(), catalog.all().len());
        assert_eq!(catalog.display_name("red velvet"), "Red Velvet");
        assert_eq!(catalog.display_name("unknown"), "unknown");
    }

    #[test]
    fn test_find_member() {
        let catalog = GroupCatalog::with_builtin(vec![]);
        let (name, group) = catalog.find_member("  jennie ").unwrap();
        assert_eq!(name, "Jennie");
        assert_eq!(group.key, "blackpink");
        assert!(catalog.find_member("nobody").is_none());
    }
}
