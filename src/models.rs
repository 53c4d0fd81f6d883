//! Wire types shared by the HTTP service and its client.
//!
//! Requests are strict: the server rejects what it cannot parse. Read views
//! (`StockLine`, `SaleLine`) are lenient: a malformed number is read as absent
//! so summaries stay available even when a record is damaged.

use crate::errors::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Role of an authenticated user. Only `admin` carries extra rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// May record intake as well as sales
    Admin,
    /// May record sales only
    Staff,
}

impl Role {
    /// Wire spelling of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::Staff
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// Identity of the caller as reported by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Display name
    pub name: String,
    /// Role
    pub role: Role,
}

/// Body of `POST /products`.
///
/// `addedBy` is not part of the request: the server stamps the caller's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductRequest {
    /// Date received; today when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Proforma reference
    #[serde(default)]
    pub proforma: String,
    /// Product name
    pub product: String,
    /// Units received
    pub quantity: i64,
    /// Unit price
    pub price: f64,
    /// Manufacturer
    #[serde(default)]
    pub oem: String,
    /// Reorder threshold
    #[serde(default)]
    pub reorder: i64,
}

/// Body of `POST /sales/sell`.
///
/// The client names the line and the delta only; the remaining quantity is
/// always computed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    /// Date of sale; today when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Stock line to sell from; looked up by `product` name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    /// Product name
    #[serde(default)]
    pub product: String,
    /// Units to sell
    pub quantity: i64,
    /// Unit sale price
    pub price: f64,
    /// Customer name
    #[serde(default)]
    pub customer: String,
    /// Purchase-order reference
    #[serde(default)]
    pub po: String,
    /// Invoice reference, doubles as the idempotency key
    #[serde(default)]
    pub invoice: String,
}

/// Available-stock line as read by clients.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StockLine {
    /// Stock line id
    #[serde(deserialize_with = "lenient::integer")]
    pub id: Option<i64>,
    /// Date received, as sent
    pub date: String,
    /// Proforma reference
    pub proforma: String,
    /// Product name
    pub product: String,
    /// Units remaining
    #[serde(deserialize_with = "lenient::integer")]
    pub quantity: Option<i64>,
    /// Unit price
    #[serde(deserialize_with = "lenient::number")]
    pub price: Option<f64>,
    /// Manufacturer
    pub oem: String,
    /// Reorder threshold
    #[serde(deserialize_with = "lenient::integer")]
    pub reorder: Option<i64>,
    /// Who recorded the intake
    pub added_by: String,
}

impl StockLine {
    /// Whether the line is below its reorder threshold. Unknown values never trigger.
    #[must_use]
    pub fn needs_reorder(&self) -> bool {
        matches!((self.quantity, self.reorder), (Some(q), Some(r)) if q < r)
    }
}

/// Sold-stock line as read by clients.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleLine {
    /// Sale id
    #[serde(deserialize_with = "lenient::integer")]
    pub id: Option<i64>,
    /// Date of sale, as sent
    pub date: String,
    /// Stock line the sale consumed
    #[serde(deserialize_with = "lenient::integer")]
    pub product_id: Option<i64>,
    /// Product name
    pub product: String,
    /// Units sold
    #[serde(deserialize_with = "lenient::integer")]
    pub quantity: Option<i64>,
    /// Unit sale price
    #[serde(deserialize_with = "lenient::number")]
    pub price: Option<f64>,
    /// Customer name
    pub customer: String,
    /// Purchase-order reference
    pub po: String,
    /// Invoice reference
    pub invoice: String,
    /// Who recorded the sale
    pub sold_by: String,
}

/// Structured failure body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
    /// Machine-readable failure
    pub detail: Failure,
}

/// Machine-readable failure kinds carried in [`ErrorBody`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// Malformed input
    Validation {
        /// Explanation
        message: String,
    },
    /// No such stock line
    ProductNotFound {
        /// Requested name or id
        name: String,
    },
    /// Name shared by several lines
    AmbiguousProduct {
        /// Shared name
        name: String,
        /// Matching lines
        lines: usize,
    },
    /// Not enough units
    InsufficientStock {
        /// Product name
        product: String,
        /// Units available
        available: i64,
        /// Units requested
        requested: i64,
    },
    /// Invoice reused for a different sale
    DuplicateInvoice {
        /// Canonical invoice
        invoice: String,
    },
    /// Missing or unknown credential
    Unauthorized,
    /// Role too weak
    Forbidden {
        /// Refused action
        action: String,
    },
    /// Anything the caller cannot act on
    Internal,
}

impl From<&Error> for Failure {
    fn from(error: &Error) -> Self {
        match error {
            Error::Validation { message } => Self::Validation {
                message: message.clone(),
            },
            Error::ProductNotFound { name } => Self::ProductNotFound { name: name.clone() },
            Error::AmbiguousProduct { name, lines } => Self::AmbiguousProduct {
                name: name.clone(),
                lines: *lines,
            },
            Error::InsufficientStock {
                product,
                available,
                requested,
            } => Self::InsufficientStock {
                product: product.clone(),
                available: *available,
                requested: *requested,
            },
            Error::DuplicateInvoice { invoice } => Self::DuplicateInvoice {
                invoice: invoice.clone(),
            },
            Error::Unauthorized => Self::Unauthorized,
            Error::Forbidden { action } => Self::Forbidden {
                action: action.clone(),
            },
            Error::Config { .. }
            | Error::Transport { .. }
            | Error::Database(_)
            | Error::Io(_) => Self::Internal,
        }
    }
}

impl ErrorBody {
    /// Converts a received body back into a typed error.
    ///
    /// `status` is kept for failures that have no typed counterpart.
    #[must_use]
    pub fn into_error(self, status: u16) -> Error {
        match self.detail {
            Failure::Validation { message } => Error::Validation { message },
            Failure::ProductNotFound { name } => Error::ProductNotFound { name },
            Failure::AmbiguousProduct { name, lines } => Error::AmbiguousProduct { name, lines },
            Failure::InsufficientStock {
                product,
                available,
                requested,
            } => Error::InsufficientStock {
                product,
                available,
                requested,
            },
            Failure::DuplicateInvoice { invoice } => Error::DuplicateInvoice { invoice },
            Failure::Unauthorized => Error::Unauthorized,
            Failure::Forbidden { action } => Error::Forbidden { action },
            Failure::Internal => Error::Transport {
                status: Some(status),
                message: self.error,
            },
        }
    }
}

/// Tolerant number parsing for read views.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn parse_f64(value: &Value) -> Option<f64> {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|v| v.is_finite())
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(parse_f64(&value))
    }

    pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let exact = match &value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        // fractional input truncates toward zero
        #[allow(clippy::cast_possible_truncation)]
        Ok(exact.or_else(|| parse_f64(&value).map(|v| v.trunc() as i64)))
    }
}
