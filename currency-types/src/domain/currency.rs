//! Currency catalog entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::code::CurrencyCode;
use crate::error::DomainError;

/// Maximum length of a currency display name.
pub const MAX_CURRENCY_NAME_LEN: usize = 50;

/// Unique identifier for a Currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CurrencyId(Uuid);

impl CurrencyId {
    /// Creates a new random CurrencyId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a CurrencyId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for CurrencyId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A currency known to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Currency {
    /// Unique identifier
    pub id: CurrencyId,
    /// Three letter code, unique across the catalog
    #[schema(value_type = String, example = "EUR")]
    pub code: CurrencyCode,
    /// Human-readable name
    #[schema(example = "Euro")]
    pub name: String,
    /// Base currency used when requesting rates for this currency
    #[schema(value_type = String, example = "USD")]
    pub base: CurrencyCode,
    /// When the currency was added to the catalog
    pub created_at: DateTime<Utc>,
}

impl Currency {
    /// Creates a new catalog entry stamped with the current time.
    ///
    /// # Validation
    /// - Name cannot be blank
    /// - Name cannot exceed [`MAX_CURRENCY_NAME_LEN`] characters
    pub fn new(code: CurrencyCode, name: String, base: CurrencyCode) -> Result<Self, DomainError> {
        validate_name(&name)?;

        Ok(Self {
            id: CurrencyId::new(),
            code,
            name,
            base,
            created_at: Utc::now(),
        })
    }

    /// Creates a currency with all fields specified (for database reconstruction).
    pub fn from_parts(
        id: CurrencyId,
        code: CurrencyCode,
        name: String,
        base: CurrencyCode,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            code,
            name,
            base,
            created_at,
        }
    }

    /// Replaces the mutable fields. Code, id and creation time never change.
    pub fn rename(&mut self, name: String, base: CurrencyCode) -> Result<(), DomainError> {
        validate_name(&name)?;
        self.name = name;
        self.base = base;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Currency name is required".into(),
        ));
    }
    if name.chars().count() > MAX_CURRENCY_NAME_LEN {
        return Err(DomainError::ValidationError(format!(
            "Currency name cannot exceed {} characters",
            MAX_CURRENCY_NAME_LEN
        )));
    }
    Ok(())
}
