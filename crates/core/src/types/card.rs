//! Card attribute types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Print finish of a physical card.
///
/// Serialized in lowercase, matching Scryfall's `finishes` values that the
/// frontend submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardFinish {
    /// Standard non-foil printing.
    Nonfoil,
    /// Traditional foil.
    Foil,
    /// Etched foil.
    Etched,
}

/// Error parsing a card finish from a string.
#[derive(Debug, Error)]
#[error("unknown card finish: {0}")]
pub struct ParseFinishError(String);

impl CardFinish {
    /// The lowercase string form, as stored and as sent by the frontend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nonfoil => "nonfoil",
            Self::Foil => "foil",
            Self::Etched => "etched",
        }
    }

    /// Whether the Cardtrader marketplace query should filter on foil
    /// listings. Etched cards are foil as far as Cardtrader is concerned.
    #[must_use]
    pub const fn is_foil(self) -> bool {
        matches!(self, Self::Foil | Self::Etched)
    }
}

impl ::core::fmt::Display for CardFinish {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ::core::str::FromStr for CardFinish {
    type Err = ParseFinishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nonfoil" => Ok(Self::Nonfoil),
            "foil" => Ok(Self::Foil),
            "etched" => Ok(Self::Etched),
            other => Err(ParseFinishError(other.to_owned())),
        }
    }
}

#[cfg(feature = "postgres")]
impl ::sqlx::Type<::sqlx::Postgres> for CardFinish {
    fn type_info() -> ::sqlx::postgres::PgTypeInfo {
        <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
        <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for CardFinish {
    fn decode(
        value: ::sqlx::postgres::PgValueRef<'r>,
    ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
        let raw = <&str as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
        Ok(raw.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl ::sqlx::Encode<'_, ::sqlx::Postgres> for CardFinish {
    fn encode_by_ref(
        &self,
        buf: &mut ::sqlx::postgres::PgArgumentBuffer,
    ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
        <&str as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_parse_roundtrip() {
        for finish in [CardFinish::Nonfoil, CardFinish::Foil, CardFinish::Etched] {
            let parsed: CardFinish = finish.as_str().parse().unwrap();
            assert_eq!(parsed, finish);
        }
    }

    #[test]
    fn test_finish_parse_unknown() {
        assert!("glossy".parse::<CardFinish>().is_err());
    }

    #[test]
    fn test_finish_serde_lowercase() {
        let json = serde_json::to_string(&CardFinish::Nonfoil).unwrap();
        assert_eq!(json, "\"nonfoil\"");
        let back: CardFinish = serde_json::from_str("\"foil\"").unwrap();
        assert_eq!(back, CardFinish::Foil);
    }

    #[test]
    fn test_foil_filter() {
        assert!(!CardFinish::Nonfoil.is_foil());
        assert!(CardFinish::Foil.is_foil());
        assert!(CardFinish::Etched.is_foil());
    }
}
