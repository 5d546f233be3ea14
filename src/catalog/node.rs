//! Catalog entities.
//!
//! A [`Node`] is one documented program element. Its [`Kind`] is a closed
//! enumeration: every consumer (page dispatchers, tag file writer) matches it
//! exhaustively, so a new kind cannot slip through any writer unclassified.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Stable unique identifier of a catalog entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Kind
// ============================================================================

/// Kind of a documented entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    Namespace,
    /// Class, struct or union.
    Record,
    Function,
    Enum,
    Enumerator,
    Typedef,
    /// Namespace alias.
    Alias,
    /// Using-declaration or using-directive.
    Using,
    Concept,
    Friend,
    Variable,
    Field,
    /// Explicit specialization of a template.
    Specialization,
    /// Deduction guide.
    Guide,
    /// Group of functions sharing one name.
    OverloadSet,
}

impl Kind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::Namespace,
        Self::Record,
        Self::Function,
        Self::Enum,
        Self::Enumerator,
        Self::Typedef,
        Self::Alias,
        Self::Using,
        Self::Concept,
        Self::Friend,
        Self::Variable,
        Self::Field,
        Self::Specialization,
        Self::Guide,
        Self::OverloadSet,
    ];

    /// Lowercase name, as used in serialized catalogs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::Record => "record",
            Self::Function => "function",
            Self::Enum => "enum",
            Self::Enumerator => "enumerator",
            Self::Typedef => "typedef",
            Self::Alias => "alias",
            Self::Using => "using",
            Self::Concept => "concept",
            Self::Friend => "friend",
            Self::Variable => "variable",
            Self::Field => "field",
            Self::Specialization => "specialization",
            Self::Guide => "guide",
            Self::OverloadSet => "overload-set",
        }
    }

    /// Plural heading used when listing members of this kind.
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Namespace => "Namespaces",
            Self::Record => "Types",
            Self::Function => "Functions",
            Self::Enum => "Enums",
            Self::Enumerator => "Enumerators",
            Self::Typedef => "Typedefs",
            Self::Alias => "Namespace Aliases",
            Self::Using => "Using Declarations",
            Self::Concept => "Concepts",
            Self::Friend => "Friends",
            Self::Variable => "Variables",
            Self::Field => "Data Members",
            Self::Specialization => "Specializations",
            Self::Guide => "Deduction Guides",
            Self::OverloadSet => "Overloads",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Function signature
// ============================================================================

/// One function parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter type, as spelled in the source.
    #[serde(rename = "type")]
    pub ty: String,
    /// Parameter name (empty for unnamed parameters).
    #[serde(default)]
    pub name: String,
}

impl Param {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
        }
    }
}

/// Return type and parameters of a function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub return_type: String,
    #[serde(default)]
    pub params: Vec<Param>,
}

impl Signature {
    pub fn new(return_type: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            return_type: return_type.into(),
            params,
        }
    }

    /// Parameter list as `(type name, type name)`.
    ///
    /// Unnamed parameters contribute only their type.
    pub fn arglist(&self) -> String {
        let mut out = String::with_capacity(2 + self.params.len() * 16);
        out.push('(');
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&param.ty);
            if !param.name.is_empty() {
                out.push(' ');
                out.push_str(&param.name);
            }
        }
        out.push(')');
        out
    }
}

// ============================================================================
// Node
// ============================================================================

/// One documented entity.
///
/// `qualified_name` is derived from the parent chain when the catalog is
/// assembled and is never read from input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: Kind,
    /// Display name (empty for the global namespace and anonymous entities).
    #[serde(default)]
    pub name: String,
    #[serde(skip)]
    pub qualified_name: String,
    /// Children in declaration order.
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub parent: Option<NodeId>,
    /// Present for functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
}

impl Node {
    pub fn new(id: NodeId, kind: Kind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            qualified_name: String::new(),
            children: Vec::new(),
            parent: None,
            signature: None,
        }
    }

    #[inline]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arglist_single_param() {
        let sig = Signature::new("int", vec![Param::new("int", "x")]);
        assert_eq!(sig.arglist(), "(int x)");
    }

    #[test]
    fn test_arglist_no_trailing_separator() {
        let sig = Signature::new(
            "void",
            vec![Param::new("char const*", "s"), Param::new("std::size_t", "n")],
        );
        assert_eq!(sig.arglist(), "(char const* s, std::size_t n)");
    }

    #[test]
    fn test_arglist_empty_and_unnamed() {
        assert_eq!(Signature::new("void", vec![]).arglist(), "()");
        let sig = Signature::new("void", vec![Param::new("int", ""), Param::new("bool", "b")]);
        assert_eq!(sig.arglist(), "(int, bool b)");
    }

    #[test]
    fn test_kind_serde_names() {
        for kind in Kind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            let back: Kind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }
}
