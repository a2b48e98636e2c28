use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One marginal-rate band. `max_income` of `None` means unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            rate,
        }
    }

    /// Width of the band, `None` when unbounded.
    pub fn width(&self) -> Option<Decimal> {
        self.max_income.map(|max| max - self.min_income)
    }

    /// `(min, max]` containment, used to pick the marginal bracket.
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income > self.min_income && self.max_income.is_none_or(|max| income <= max)
    }
}

/// Structural problems found while building a [`BracketTable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("bracket table has no brackets")]
    Empty,

    #[error("first bracket must start at 0, starts at {0}")]
    NonZeroStart(Decimal),

    #[error("bracket {index} starts at {found}, expected {expected}")]
    Gap {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {0} is unbounded but is not the last bracket")]
    UnboundedBeforeEnd(usize),

    #[error("last bracket must be unbounded")]
    BoundedTop,

    #[error("bracket {index} has an empty or inverted range")]
    EmptyRange { index: usize },

    #[error("bracket {index} rate {rate} is outside [0, 1)")]
    RateOutOfRange { index: usize, rate: Decimal },

    #[error("bracket {index} rate {rate} is lower than the previous bracket")]
    RegressiveRate { index: usize, rate: Decimal },
}

/// An ordered, gapless, progressive sequence of brackets covering `[0, ∞)`.
///
/// Public construction goes through [`BracketTable::new`] (or serde, which
/// calls it), so the tax walk can rely on every structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, TableError> {
        let first = brackets.first().ok_or(TableError::Empty)?;
        if first.min_income != Decimal::ZERO {
            return Err(TableError::NonZeroStart(first.min_income));
        }

        let last_index = brackets.len() - 1;
        let mut previous_rate = Decimal::ZERO;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate >= Decimal::ONE {
                return Err(TableError::RateOutOfRange {
                    index,
                    rate: bracket.rate,
                });
            }
            if bracket.rate < previous_rate {
                return Err(TableError::RegressiveRate {
                    index,
                    rate: bracket.rate,
                });
            }
            previous_rate = bracket.rate;

            match bracket.max_income {
                Some(max) if max <= bracket.min_income => {
                    return Err(TableError::EmptyRange { index });
                }
                Some(_) if index == last_index => return Err(TableError::BoundedTop),
                None if index != last_index => {
                    return Err(TableError::UnboundedBeforeEnd(index));
                }
                _ => {}
            }

            if let Some(next) = brackets.get(index + 1) {
                // max is Some here; the unbounded case returned above
                let expected = bracket.max_income.unwrap_or(Decimal::MAX);
                if next.min_income != expected {
                    return Err(TableError::Gap {
                        index: index + 1,
                        expected,
                        found: next.min_income,
                    });
                }
            }
        }

        Ok(Self { brackets })
    }

    /// For compiled-in data whose validity is covered by tests.
    pub(crate) fn from_trusted(brackets: Vec<TaxBracket>) -> Self {
        Self { brackets }
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxBracket> {
        self.brackets.iter()
    }
}

impl<'de> Deserialize<'de> for BracketTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let brackets = Vec::<TaxBracket>::deserialize(deserializer)?;
        BracketTable::new(brackets).map_err(serde::de::Error::custom)
    }
}
