//! Tradable index identifiers

use crate::columns::INDICATOR_PREFIX;
use serde::{Deserialize, Serialize};

/// Stock index an observation belongs to.
///
/// Declaration order is the fixed indicator order used for deterministic
/// tie-breaks wherever more than one instrument qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstrumentId {
    Dax,
    Mdax,
    Sdax,
}

impl InstrumentId {
    /// All instruments in fixed indicator order
    pub const ALL: [InstrumentId; 3] = [InstrumentId::Dax, InstrumentId::Mdax, InstrumentId::Sdax];

    /// Short ticker-style code, e.g. `MDAX`
    pub fn code(&self) -> &'static str {
        match self {
            InstrumentId::Dax => "DAX",
            InstrumentId::Mdax => "MDAX",
            InstrumentId::Sdax => "SDAX",
        }
    }

    /// Name of the one-hot indicator column, e.g. `Index_MDAX`
    pub fn indicator_column(&self) -> String {
        format!("{}{}", INDICATOR_PREFIX, self.code())
    }

    /// Parse a short code, case-insensitively
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.code().eq_ignore_ascii_case(code.trim()))
    }

    /// Parse an indicator column header such as `Index_SDAX`
    pub fn from_indicator_column(column: &str) -> Option<Self> {
        column
            .trim()
            .strip_prefix(INDICATOR_PREFIX)
            .and_then(Self::from_code)
    }

    /// Decode one row of one-hot indicators.
    ///
    /// `indicators` pairs each instrument with its cell value; a value of
    /// `1.0` counts as active. The result is independent of the order of
    /// `indicators`.
    pub fn resolve_indicators(indicators: &[(InstrumentId, f64)]) -> IndicatorResolution {
        let mut active: Vec<InstrumentId> = indicators
            .iter()
            .filter(|(_, value)| *value == 1.0)
            .map(|(id, _)| *id)
            .collect();
        active.sort();
        active.dedup();

        match active.as_slice() {
            [] => IndicatorResolution::Inactive,
            [only] => IndicatorResolution::Single(*only),
            [first, ..] => IndicatorResolution::Ambiguous {
                chosen: *first,
                active: active.clone(),
            },
        }
    }
}

impl std::fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Outcome of decoding a one-hot indicator row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorResolution {
    /// Exactly one indicator set
    Single(InstrumentId),
    /// Several indicators set; `chosen` is the first in fixed order
    Ambiguous {
        chosen: InstrumentId,
        active: Vec<InstrumentId>,
    },
    /// No indicator set
    Inactive,
}

impl IndicatorResolution {
    /// Instrument the row is attributed to, if any
    pub fn instrument(&self) -> Option<InstrumentId> {
        match self {
            IndicatorResolution::Single(id) => Some(*id),
            IndicatorResolution::Ambiguous { chosen, .. } => Some(*chosen),
            IndicatorResolution::Inactive => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_column_roundtrip() {
        for id in InstrumentId::ALL {
            assert_eq!(InstrumentId::from_indicator_column(&id.indicator_column()), Some(id));
        }
        assert_eq!(InstrumentId::from_indicator_column("Index_TECDAX"), None);
        assert_eq!(InstrumentId::from_indicator_column("Close"), None);
    }

    #[test]
    fn test_single_indicator() {
        let row = [
            (InstrumentId::Dax, 0.0),
            (InstrumentId::Mdax, 1.0),
            (InstrumentId::Sdax, 0.0),
        ];
        assert_eq!(
            InstrumentId::resolve_indicators(&row),
            IndicatorResolution::Single(InstrumentId::Mdax)
        );
    }

    #[test]
    fn test_ambiguous_indicator_picks_first_in_fixed_order() {
        let row = [
            (InstrumentId::Sdax, 1.0),
            (InstrumentId::Mdax, 1.0),
            (InstrumentId::Dax, 0.0),
        ];
        let resolution = InstrumentId::resolve_indicators(&row);
        assert_eq!(resolution.instrument(), Some(InstrumentId::Mdax));
        assert!(matches!(resolution, IndicatorResolution::Ambiguous { .. }));
    }

    #[test]
    fn test_no_active_indicator() {
        let row = [(InstrumentId::Dax, 0.0), (InstrumentId::Mdax, 0.0)];
        assert_eq!(InstrumentId::resolve_indicators(&row).instrument(), None);
    }
}
