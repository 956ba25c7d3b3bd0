use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of a block material, e.g. `"stone"`. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKind(Arc<str>);

impl BlockKind {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single voxel. Replaced wholesale on edit, never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Block {
    #[default]
    Empty,
    Material(BlockKind),
}

impl Block {
    pub fn material(kind: impl AsRef<str>) -> Self {
        Self::Material(BlockKind::new(kind))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn kind(&self) -> Option<&BlockKind> {
        match self {
            Self::Empty => None,
            Self::Material(kind) => Some(kind),
        }
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("empty"),
            Self::Material(kind) => write!(f, "{kind}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_block_is_empty() {
        assert!(Block::default().is_empty());
        assert_eq!(Block::default().kind(), None);
    }

    #[test]
    fn material_exposes_kind() {
        let b = Block::material("stone");
        assert!(!b.is_empty());
        assert_eq!(b.kind().map(BlockKind::as_str), Some("stone"));
        assert_eq!(b.to_string(), "stone");
    }
}
