//! The closed set of transliteration operations and the registry that resolves them.
//!
//! Every operation the gateway exposes is declared once in [`OPERATIONS`].
//! The table is the single source of truth for the upstream path segment,
//! the public route name and the discovery description. Adding an operation
//! is a code change here, never a runtime effect.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Canonical identifier of one transliteration direction.
///
/// The string form (see [`OperationId::as_str`]) is the key used by the
/// generic endpoint and in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationId {
    AutoDetectPersioArabicScript,
    AutoDetectSindhiHindiScript,
    #[serde(rename = "Gurmukhi2Shahmukhi")]
    GurmukhiToShahmukhi,
    #[serde(rename = "Hindi2Urdu")]
    HindiToUrdu,
    #[serde(rename = "Shahmukhi2Gurmukhi")]
    ShahmukhiToGurmukhi,
    #[serde(rename = "SindhiDEV2Roman")]
    SindhiDevToRoman,
    #[serde(rename = "SindhiDEV2SindhiUR")]
    SindhiDevToSindhiUr,
    #[serde(rename = "SindhiUR2SindhiDEV")]
    SindhiUrToSindhiDev,
    #[serde(rename = "Urdu2Hindi")]
    UrduToHindi,
}

impl OperationId {
    /// Canonical string key, e.g. `"Gurmukhi2Shahmukhi"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoDetectPersioArabicScript => "AutoDetectPersioArabicScript",
            Self::AutoDetectSindhiHindiScript => "AutoDetectSindhiHindiScript",
            Self::GurmukhiToShahmukhi => "Gurmukhi2Shahmukhi",
            Self::HindiToUrdu => "Hindi2Urdu",
            Self::ShahmukhiToGurmukhi => "Shahmukhi2Gurmukhi",
            Self::SindhiDevToRoman => "SindhiDEV2Roman",
            Self::SindhiDevToSindhiUr => "SindhiDEV2SindhiUR",
            Self::SindhiUrToSindhiDev => "SindhiUR2SindhiDEV",
            Self::UrduToHindi => "Urdu2Hindi",
        }
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transliteration type: {0}")]
pub struct ParseOperationError(pub String);

impl FromStr for OperationId {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationRegistry::builtin()
            .resolve(s)
            .map(|descriptor| descriptor.id)
            .ok_or_else(|| ParseOperationError(s.to_string()))
    }
}

/// Static description of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Canonical identifier.
    pub id: OperationId,
    /// Path segment appended to the upstream base address.
    pub upstream_path: &'static str,
    /// Name used in the public route `/transliterate/<route_name>`.
    pub route_name: &'static str,
    /// Human-readable label shown by discovery.
    pub description: &'static str,
}

impl OperationDescriptor {
    /// Canonical identifier as a string.
    #[must_use]
    pub fn identifier(&self) -> &'static str {
        self.id.as_str()
    }
}

/// Every operation the gateway serves, in discovery order.
pub const OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor {
        id: OperationId::AutoDetectPersioArabicScript,
        upstream_path: "AutoDetectPersioArabicScript",
        route_name: "AutoDetectPersioArabicScript",
        description: "Auto-detect Persian-Arabic Script",
    },
    OperationDescriptor {
        id: OperationId::AutoDetectSindhiHindiScript,
        upstream_path: "AutoDetectSindhiHindiScript",
        route_name: "AutoDetectSindhiHindiScript",
        description: "Auto-detect Sindhi-Hindi Script",
    },
    OperationDescriptor {
        id: OperationId::GurmukhiToShahmukhi,
        upstream_path: "Gurmukhi2Shahmukhi",
        route_name: "GurmukhiToShahmukhi",
        description: "Gurmukhi to Shahmukhi",
    },
    OperationDescriptor {
        id: OperationId::HindiToUrdu,
        upstream_path: "Hindi2Urdu",
        route_name: "HindiToUrdu",
        description: "Hindi to Urdu",
    },
    OperationDescriptor {
        id: OperationId::ShahmukhiToGurmukhi,
        upstream_path: "Shahmukhi2Gurmukhi",
        route_name: "ShahmukhiToGurmukhi",
        description: "Shahmukhi to Gurmukhi",
    },
    OperationDescriptor {
        id: OperationId::SindhiDevToRoman,
        upstream_path: "SindhiDEV2Roman",
        route_name: "SindhiDEVToRoman",
        description: "SindhiDEV to Roman",
    },
    OperationDescriptor {
        id: OperationId::SindhiDevToSindhiUr,
        upstream_path: "SindhiDEV2SindhiUR",
        route_name: "SindhiDEVToSindhiUR",
        description: "SindhiDEV to SindhiUR",
    },
    OperationDescriptor {
        id: OperationId::SindhiUrToSindhiDev,
        upstream_path: "SindhiUR2SindhiDEV",
        route_name: "SindhiURToSindhiDEV",
        description: "SindhiUR to SindhiDEV",
    },
    OperationDescriptor {
        id: OperationId::UrduToHindi,
        upstream_path: "Urdu2Hindi",
        route_name: "UrduToHindi",
        description: "Urdu to Hindi",
    },
];

static BUILTIN: LazyLock<OperationRegistry> = LazyLock::new(|| OperationRegistry::new(OPERATIONS));

/// Read-only lookup over a fixed operation table.
///
/// Built once and shared for the process lifetime. There is no way to add
/// or remove entries after construction.
#[derive(Debug)]
pub struct OperationRegistry {
    table: &'static [OperationDescriptor],
    /// Canonical identifier -> index into `table`.
    by_identifier: HashMap<&'static str, usize>,
    /// Public route name -> index into `table`.
    by_route_name: HashMap<&'static str, usize>,
}

impl OperationRegistry {
    /// Indexes the given table. Later duplicates of a key are ignored.
    #[must_use]
    pub fn new(table: &'static [OperationDescriptor]) -> Self {
        let mut by_identifier = HashMap::with_capacity(table.len());
        let mut by_route_name = HashMap::with_capacity(table.len());
        for (idx, descriptor) in table.iter().enumerate() {
            by_identifier.entry(descriptor.identifier()).or_insert(idx);
            by_route_name.entry(descriptor.route_name).or_insert(idx);
        }
        Self {
            table,
            by_identifier,
            by_route_name,
        }
    }

    /// The process-wide registry over [`OPERATIONS`].
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Resolves a canonical identifier such as `"Hindi2Urdu"`.
    #[must_use]
    pub fn resolve(&self, identifier: &str) -> Option<&'static OperationDescriptor> {
        self.by_identifier
            .get(identifier)
            .map(|&idx| &self.table[idx])
    }

    /// Resolves a public route name such as `"HindiToUrdu"`.
    #[must_use]
    pub fn resolve_route_name(&self, route_name: &str) -> Option<&'static OperationDescriptor> {
        self.by_route_name
            .get(route_name)
            .map(|&idx| &self.table[idx])
    }

    /// Resolves by canonical identifier first, then by public route name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&'static OperationDescriptor> {
        self.resolve(name).or_else(|| self.resolve_route_name(name))
    }

    /// All descriptors in declaration order.
    #[must_use]
    pub fn list(&self) -> &'static [OperationDescriptor] {
        self.table
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
