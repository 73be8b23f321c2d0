use crate::error::SearchError;
use crate::query::types::Query;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Target names that expand to every index.
pub const ALL_INDICES: [&str; 2] = ["_all", "*"];

/// One concrete index a target name stands for, with the filter to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub index: String,
    pub filter: Option<Query>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasMetadata {
    pub alias: String,
    pub index: String,
    pub filter: Option<Query>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AliasActionKind {
    AddAlias,
    RemoveAlias,
}

/// An administrative alias mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasAction {
    pub kind: AliasActionKind,
    pub index: String,
    pub alias: String,
    pub filter: Option<Query>,
}

impl AliasAction {
    pub fn add(index: impl Into<String>, alias: impl Into<String>, filter: Option<Query>) -> Self {
        Self {
            kind: AliasActionKind::AddAlias,
            index: index.into(),
            alias: alias.into(),
            filter,
        }
    }

    pub fn remove(index: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            kind: AliasActionKind::RemoveAlias,
            index: index.into(),
            alias: alias.into(),
            filter: None,
        }
    }
}

/// An immutable, versioned view of index and alias names.
#[derive(Debug, Clone, Default)]
pub struct AliasSnapshot {
    pub version: u64,
    pub indices: BTreeSet<String>,
    pub aliases: BTreeMap<String, AliasMetadata>,
}

impl AliasSnapshot {
    /// Resolves an index name, an alias name, or `_all`/`*`.
    pub fn resolve(&self, name: &str) -> Result<Vec<Resolution>, SearchError> {
        if ALL_INDICES.contains(&name) {
            if self.indices.is_empty() {
                return Err(SearchError::IndexMissing(name.to_string()));
            }
            return Ok(self
                .indices
                .iter()
                .map(|index| Resolution {
                    index: index.clone(),
                    filter: None,
                })
                .collect());
        }

        if self.indices.contains(name) {
            return Ok(vec![Resolution {
                index: name.to_string(),
                filter: None,
            }]);
        }

        match self.aliases.get(name) {
            Some(alias) => Ok(vec![Resolution {
                index: alias.index.clone(),
                filter: alias.filter.clone(),
            }]),
            None => Err(SearchError::AliasMissing(name.to_string())),
        }
    }

    /// Resolves a name that has to stand for exactly one index.
    pub fn resolve_single(&self, name: &str) -> Result<Resolution, SearchError> {
        let mut resolutions = self.resolve(name)?;
        if resolutions.len() != 1 {
            return Err(SearchError::InvalidRequest(format!(
                "[{}] resolves to {} indices, expected exactly one",
                name,
                resolutions.len()
            )));
        }
        Ok(resolutions.remove(0))
    }

    pub fn aliases_of(&self, index: &str) -> Vec<AliasMetadata> {
        self.aliases
            .values()
            .filter(|alias| alias.index == index)
            .cloned()
            .collect()
    }

    pub(crate) fn apply(&mut self, action: &AliasAction) -> Result<(), SearchError> {
        match action.kind {
            AliasActionKind::AddAlias => {
                if !self.indices.contains(&action.index) {
                    return Err(SearchError::IndexMissing(action.index.clone()));
                }
                if self.indices.contains(&action.alias) {
                    return Err(SearchError::NameConflict {
                        name: action.alias.clone(),
                        existing: "index".to_string(),
                    });
                }
                self.aliases.insert(
                    action.alias.clone(),
                    AliasMetadata {
                        alias: action.alias.clone(),
                        index: action.index.clone(),
                        filter: action.filter.clone(),
                    },
                );
            }
            AliasActionKind::RemoveAlias => match self.aliases.get(&action.alias) {
                Some(existing) if existing.index == action.index || action.index.is_empty() => {
                    self.aliases.remove(&action.alias);
                }
                _ => return Err(SearchError::AliasMissing(action.alias.clone())),
            },
        }
        Ok(())
    }
}
