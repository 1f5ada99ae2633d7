use std::fmt;

use serde::{Deserialize, Serialize};

/// The two suppliers whose price lists the tool quotes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Supplier {
    #[default]
    #[serde(rename = "A")]
    Alpha,
    #[serde(rename = "B")]
    Ben,
}

impl Supplier {
    pub fn all() -> &'static [Supplier] {
        &[Supplier::Alpha, Supplier::Ben]
    }

    /// Single-letter code used in selections and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alpha => "A",
            Self::Ben => "B",
        }
    }

    /// Human-readable name used in load errors and prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Alpha => "Alpha (supplier_a.csv)",
            Self::Ben => "Ben (supplier_b.csv)",
        }
    }

    /// Accepts `A`/`B` as well as the spelled-out names, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "alpha" => Some(Self::Alpha),
            "b" | "ben" => Some(Self::Ben),
            _ => None,
        }
    }

    /// Only supplier B carries home/laminate variants in its SKUs.
    pub fn has_variants(&self) -> bool {
        matches!(self, Self::Ben)
    }
}

impl fmt::Display for Supplier {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Home type filter for supplier B items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Home {
    Hdb,
    Condo,
    Landed,
}

impl Home {
    pub fn all() -> &'static [Home] {
        &[Home::Hdb, Home::Condo, Home::Landed]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hdb => "hdb",
            Self::Condo => "condo",
            Self::Landed => "landed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hdb" => Some(Self::Hdb),
            "condo" => Some(Self::Condo),
            "landed" => Some(Self::Landed),
            _ => None,
        }
    }
}

impl fmt::Display for Home {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Laminate finish filter for supplier B items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Laminate {
    Standard,
    Sns,
}

impl Laminate {
    pub fn all() -> &'static [Laminate] {
        &[Laminate::Standard, Laminate::Sns]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Sns => "sns",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "sns" => Some(Self::Sns),
            _ => None,
        }
    }
}

impl fmt::Display for Laminate {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
