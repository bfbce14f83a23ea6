// Loader for the externally generated group data file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::CatalogError;

/// One group as it appears in a data file, before key normalization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawGroup {
    pub name: String,
    pub members: Vec<String>,
}

/// Both layouts the generator script has produced over time.
#[derive(Deserialize)]
#[serde(untagged)]
enum GroupFile {
    Listed { groups: Vec<RawGroup> },
    Mapping(BTreeMap<String, Vec<String>>),
}

/// Parse a data file body.
///
/// Accepts either `{"Group": ["a", "b"]}` or
/// `{"groups": [{"name": "Group", "members": ["a", "b"]}]}`.
/// The mapping form is returned sorted by group name since JSON objects carry no order.
pub fn parse_group_file(contents: &str) -> Result<Vec<RawGroup>, CatalogError> {
    let parsed: GroupFile = serde_json::from_str(contents)?;
    Ok(match parsed {
        GroupFile::Listed { groups } => groups,
        GroupFile::Mapping(map) => map
            .into_iter()
            .map(|(name, members)| RawGroup { name, members })
            .collect(),
    })
}

/// Load groups from `path`. A missing file is an empty contribution, not an error.
pub fn load_group_file(path: &Path) -> Result<Vec<RawGroup>, CatalogError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_group_file(&contents)
}
