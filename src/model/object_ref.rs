// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::ids::{BlockId, ConnectionId, IdError};

/// Stable reference to one diagram entity, used for selection and change deltas.
///
/// Canonical text form: `block/<id>` or `connection/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectRef {
    Block(BlockId),
    Connection(ConnectionId),
}

impl ObjectRef {
    pub fn as_block(&self) -> Option<&BlockId> {
        match self {
            Self::Block(id) => Some(id),
            Self::Connection(_) => None,
        }
    }

    pub fn as_connection(&self) -> Option<&ConnectionId> {
        match self {
            Self::Connection(id) => Some(id),
            Self::Block(_) => None,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::Block(_) => "block",
            Self::Connection(_) => "connection",
        }
    }

    pub fn id_str(&self) -> &str {
        match self {
            Self::Block(id) => id.as_str(),
            Self::Connection(id) => id.as_str(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseObjectRefError> {
        let (category, id) = input.split_once('/').ok_or(ParseObjectRefError::MissingCategory)?;
        if id.is_empty() {
            return Err(ParseObjectRefError::MissingObjectId);
        }
        match category {
            "block" => BlockId::new(id).map(Self::Block).map_err(ParseObjectRefError::InvalidId),
            "connection" => ConnectionId::new(id)
                .map(Self::Connection)
                .map_err(ParseObjectRefError::InvalidId),
            other => Err(ParseObjectRefError::UnknownCategory(other.to_owned())),
        }
    }
}

impl From<BlockId> for ObjectRef {
    fn from(id: BlockId) -> Self {
        Self::Block(id)
    }
}

impl From<ConnectionId> for ObjectRef {
    fn from(id: ConnectionId) -> Self {
        Self::Connection(id)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category(), self.id_str())
    }
}

impl FromStr for ObjectRef {
    type Err = ParseObjectRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseObjectRefError {
    #[error("missing category segment")]
    MissingCategory,
    #[error("missing object id")]
    MissingObjectId,
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("invalid object id: {0}")]
    InvalidId(#[source] IdError),
}

#[cfg(test)]
mod tests {
    use super::{ObjectRef, ParseObjectRefError};
    use crate::model::{BlockId, ConnectionId, IdError};

    #[test]
    fn parses_and_formats_canonical_refs() {
        let block = ObjectRef::parse("block/b1").expect("block ref");
        assert_eq!(block, ObjectRef::Block(BlockId::new("b1").expect("block id")));
        assert_eq!(block.to_string(), "block/b1");

        let conn: ObjectRef = "connection/c1".parse().expect("connection ref");
        assert_eq!(conn.as_connection(), Some(&ConnectionId::new("c1").expect("connection id")));
        assert_eq!(conn.as_block(), None);
    }

    #[test]
    fn rejects_malformed_refs() {
        assert_eq!(ObjectRef::parse("b1"), Err(ParseObjectRefError::MissingCategory));
        assert_eq!(ObjectRef::parse("block/"), Err(ParseObjectRefError::MissingObjectId));
        assert_eq!(
            ObjectRef::parse("edge/e1"),
            Err(ParseObjectRefError::UnknownCategory("edge".to_owned()))
        );
        assert_eq!(
            ObjectRef::parse("block/a b"),
            Err(ParseObjectRefError::InvalidId(IdError::ContainsWhitespace))
        );
    }
}
