use serde::Serialize;
use std::path::PathBuf;

/// Identity key taken from a dump's hexadecimal entity label.
pub type Address = u64;

pub const ACCESS_PUBLIC: &str = "DW_ACCESS_public";
pub const ACCESS_PROTECTED: &str = "DW_ACCESS_protected";
pub const ACCESS_PRIVATE: &str = "DW_ACCESS_private";

/// Separator between the declaring file and the qualified record name.
pub const FILE_SEPARATOR: char = '@';

/// Open interval test shared by namespaces and composite types.
/// An unknown end (no sibling seen) contains nothing.
fn in_range(start: Address, end: Option<Address>, loc: Address) -> bool {
    end.is_some_and(|end| start < loc && loc < end)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub start: Address,
    pub end: Option<Address>,
    pub decl_file: String,
    pub name: String,
}

impl Namespace {
    pub fn contains(&self, loc: Address) -> bool {
        in_range(self.start, self.end, loc)
    }
}

/// A struct, union or class definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeType {
    pub start: Address,
    pub end: Option<Address>,
    pub decl_file: String,
    pub name: String,
    pub is_class: bool,
}

impl CompositeType {
    pub fn contains(&self, loc: Address) -> bool {
        in_range(self.start, self.end, loc)
    }

    /// Access applied to members that carry no explicit accessibility.
    pub fn default_access(&self) -> &'static str {
        if self.is_class { ACCESS_PRIVATE } else { ACCESS_PUBLIC }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub loc: Address,
    pub name: String,
    pub decl_file: String,
    pub type_ref: Option<Address>,
    /// Raw accessibility token, empty when the dump did not carry one.
    pub access: String,
}

/// Either a sized type or an indirection (typedef, const, array...) to follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeAliasEntry {
    pub type_ref: Option<Address>,
    pub byte_size: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessTier {
    Public,
    Protected,
    Other,
}

impl AccessTier {
    pub fn from_access(access: &str) -> Self {
        match access {
            ACCESS_PUBLIC => AccessTier::Public,
            ACCESS_PROTECTED => AccessTier::Protected,
            _ => AccessTier::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedField {
    pub name: String,
    pub size: u64,
    pub access: String,
    pub tier: AccessTier,
}

impl PlannedField {
    pub fn new(name: String, size: u64, access: String) -> Self {
        let tier = AccessTier::from_access(&access);
        Self { name, size, access, tier }
    }
}

/// Proposed field order for one composite type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReorderPlan {
    /// `<file>@<namespaces::record>`
    pub qualified_name: String,
    pub is_class: bool,
    pub fields: Vec<PlannedField>,
}

impl ReorderPlan {
    pub fn new(qualified_name: String, is_class: bool) -> Self {
        Self { qualified_name, is_class, fields: Vec::new() }
    }

    /// Splits the qualified name into the declaring file and the record name.
    /// Record names never contain the separator, file paths might.
    pub fn target(&self) -> (PathBuf, &str) {
        match self.qualified_name.rsplit_once(FILE_SEPARATOR) {
            Some((file, record)) => (PathBuf::from(file), record),
            None => (PathBuf::new(), self.qualified_name.as_str()),
        }
    }

    pub fn record_name(&self) -> &str {
        self.target().1
    }

    pub fn field_order(&self) -> String {
        self.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(",")
    }
}
