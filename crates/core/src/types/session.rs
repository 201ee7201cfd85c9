//! Signed-in user session.
//!
//! The session payload is issued by the backend on sign-in and its shape
//! varies by role. It is modelled as a shared base record plus an
//! [`Account`] enum selected by the `role` field, so a payload with an
//! unknown role or a missing id fails to deserialize instead of flowing
//! through the dashboard as an untyped map.
//!
//! The wire form goes through a JSON object in both directions. Anything the
//! typed fields don't capture (unknown keys, explicit `null`s, a second id
//! key) stays in the account's `extra` map and is written back unchanged.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::id::{IdError, UserId};

/// Role discriminant carried in the session's `role` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular customer.
    User,
    /// Marketplace vendor.
    Vendor,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Vendor => write!(f, "vendor"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "vendor" => Ok(Self::Vendor),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Errors for session payloads that don't have a usable shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionShapeError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` must be a string")]
    NotAString { field: &'static str },
    #[error("invalid id: {0}")]
    InvalidId(#[from] IdError),
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Key the session id was read from, so it is written back under the same
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdKey {
    Id,
    UnderscoreId,
}

impl IdKey {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UnderscoreId => "_id",
        }
    }
}

/// The signed-in user's session.
///
/// Accepts `id` or `_id` for the identifier on input. When both are present
/// `id` wins and `_id` is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct UserSession {
    pub id: UserId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub username: Option<String>,
    /// Role-specific fields, selected by `role`.
    pub account: Account,
    id_key: IdKey,
}

/// Role-specific part of a session.
///
/// Fields the dashboard doesn't model (tokens, flags added by the backend)
/// are kept in `extra` so a session survives encode/decode unchanged. A
/// typed field that is set overrides an `extra` entry of the same name.
#[derive(Debug, Clone, PartialEq)]
pub enum Account {
    User {
        /// Wallet balance, when the backend sends it as a JSON number.
        wallet_balance: Option<Decimal>,
        extra: Map<String, Value>,
    },
    Vendor {
        business_name: Option<String>,
        extra: Map<String, Value>,
    },
}

impl TryFrom<Map<String, Value>> for UserSession {
    type Error = SessionShapeError;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let (id_key, raw_id) = if let Some(raw) = fields.remove("id") {
            (IdKey::Id, raw)
        } else if let Some(raw) = fields.remove("_id") {
            (IdKey::UnderscoreId, raw)
        } else {
            return Err(SessionShapeError::MissingField("id"));
        };
        let Value::String(raw_id) = raw_id else {
            return Err(SessionShapeError::NotAString {
                field: id_key.as_str(),
            });
        };
        let id = UserId::try_from(raw_id)?;

        let role = match fields.remove("role") {
            Some(Value::String(role)) => {
                Role::from_str(&role).map_err(|_| SessionShapeError::UnknownRole(role))?
            }
            Some(_) => return Err(SessionShapeError::NotAString { field: "role" }),
            None => return Err(SessionShapeError::MissingField("role")),
        };

        let email = take_text(&mut fields, "email");
        let first_name = take_text(&mut fields, "first_name");
        let last_name = take_text(&mut fields, "last_name");
        let phone = take_text(&mut fields, "phone");
        let username = take_text(&mut fields, "username");

        let account = match role {
            Role::User => {
                let wallet_balance = take_amount(&mut fields, "wallet_balance");
                Account::User {
                    wallet_balance,
                    extra: fields,
                }
            }
            Role::Vendor => {
                let business_name = take_text(&mut fields, "business_name");
                Account::Vendor {
                    business_name,
                    extra: fields,
                }
            }
        };

        Ok(Self {
            id,
            email,
            first_name,
            last_name,
            phone,
            username,
            account,
            id_key,
        })
    }
}

impl From<UserSession> for Map<String, Value> {
    fn from(session: UserSession) -> Self {
        let role = session.role();
        let (modelled, mut fields) = match session.account {
            Account::User {
                wallet_balance,
                extra,
            } => (
                wallet_balance.map(|balance| ("wallet_balance", amount_value(balance))),
                extra,
            ),
            Account::Vendor {
                business_name,
                extra,
            } => (
                business_name.map(|name| ("business_name", Value::String(name))),
                extra,
            ),
        };

        fields.insert(
            session.id_key.as_str().to_string(),
            Value::String(session.id.into_inner()),
        );
        fields.insert("role".to_string(), Value::String(role.to_string()));

        let profile = [
            ("email", session.email),
            ("first_name", session.first_name),
            ("last_name", session.last_name),
            ("phone", session.phone),
            ("username", session.username),
        ];
        let typed = profile
            .into_iter()
            .filter_map(|(key, text)| text.map(|text| (key, Value::String(text))))
            .chain(modelled);
        for (key, value) in typed {
            fields.insert(key.to_string(), value);
        }
        fields
    }
}

/// Move a string field out of `fields`. Anything else (including `null`)
/// is left where it is.
fn take_text(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key)? {
        Value::String(text) => Some(text),
        other => {
            fields.insert(key.to_string(), other);
            None
        }
    }
}

/// Move a numeric field out of `fields` as an exact decimal.
fn take_amount(fields: &mut Map<String, Value>, key: &str) -> Option<Decimal> {
    let amount = match fields.get(key)? {
        Value::Number(number) => Decimal::from_str(&number.to_string()).ok()?,
        _ => return None,
    };
    fields.remove(key);
    Some(amount)
}

/// Render an amount as a JSON number, integral when it has no scale.
fn amount_value(amount: Decimal) -> Value {
    let number = match (amount.scale(), amount.to_i64()) {
        (0, Some(whole)) => Some(Number::from(whole)),
        _ => amount.to_f64().and_then(Number::from_f64),
    };
    number.map_or_else(|| Value::String(amount.to_string()), Value::Number)
}

impl UserSession {
    /// Create a minimal session for a customer.
    #[must_use]
    pub fn user(id: UserId) -> Self {
        Self::with_account(
            id,
            Account::User {
                wallet_balance: None,
                extra: Map::new(),
            },
        )
    }

    /// Create a minimal session for a vendor.
    #[must_use]
    pub fn vendor(id: UserId, business_name: Option<String>) -> Self {
        Self::with_account(
            id,
            Account::Vendor {
                business_name,
                extra: Map::new(),
            },
        )
    }

    const fn with_account(id: UserId, account: Account) -> Self {
        Self {
            id,
            email: None,
            first_name: None,
            last_name: None,
            phone: None,
            username: None,
            account,
            id_key: IdKey::Id,
        }
    }

    /// The session's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self.account {
            Account::User { .. } => Role::User,
            Account::Vendor { .. } => Role::Vendor,
        }
    }

    /// Name to greet the user with: first name, then username, then email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or_else(|| self.id.as_str())
    }

    /// Unmodelled fields carried alongside the session.
    #[must_use]
    pub const fn extra(&self) -> &Map<String, Value> {
        match &self.account {
            Account::User { extra, .. } | Account::Vendor { extra, .. } => extra,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_user_session() {
        let session: UserSession =
            serde_json::from_value(json!({"id": "u1", "role": "user"})).unwrap();
        assert_eq!(session.id.as_str(), "u1");
        assert_eq!(session.role(), Role::User);
        assert!(session.extra().is_empty());
    }

    #[test]
    fn test_underscore_id() {
        let original = json!({"_id": "65ab", "role": "vendor"});
        let session: UserSession = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(session.id.as_str(), "65ab");
        assert_eq!(session.role(), Role::Vendor);
        assert_eq!(serde_json::to_value(&session).unwrap(), original);
    }

    #[test]
    fn test_both_id_keys() {
        let original = json!({"_id": "65ab", "id": "65ab", "role": "user"});
        let session: UserSession = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(session.id.as_str(), "65ab");
        assert_eq!(session.extra().get("_id"), Some(&json!("65ab")));
        assert_eq!(serde_json::to_value(&session).unwrap(), original);
    }

    #[test]
    fn test_plain_id_wins_over_underscore_id() {
        let session: UserSession = serde_json::from_value(json!({
            "_id": "6650f1c2",
            "id": "u1",
            "role": "user"
        }))
        .unwrap();
        assert_eq!(session.id.as_str(), "u1");
    }

    #[test]
    fn test_vendor_fields() {
        let session: UserSession = serde_json::from_value(json!({
            "id": "v1",
            "role": "vendor",
            "business_name": "Ada Gadgets",
            "email": "ada@example.com"
        }))
        .unwrap();

        match &session.account {
            Account::Vendor { business_name, .. } => {
                assert_eq!(business_name.as_deref(), Some("Ada Gadgets"));
            }
            Account::User { .. } => panic!("expected vendor account"),
        }
        assert_eq!(session.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let original = json!({
            "id": "u1",
            "role": "user",
            "first_name": "Chidi",
            "token": "abc.def",
            "kyc": {"nin_verified": true}
        });

        let session: UserSession = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(session.extra().get("token"), Some(&json!("abc.def")));
        assert_eq!(serde_json::to_value(&session).unwrap(), original);
    }

    #[test]
    fn test_null_profile_fields_round_trip() {
        let original = json!({
            "id": "u1",
            "role": "user",
            "first_name": null,
            "phone": null,
            "wallet_balance": null
        });

        let session: UserSession = serde_json::from_value(original.clone()).unwrap();
        assert!(session.first_name.is_none());
        assert_eq!(serde_json::to_value(&session).unwrap(), original);
    }

    #[test]
    fn test_set_field_replaces_stored_null() {
        let mut session: UserSession =
            serde_json::from_value(json!({"id": "u1", "role": "user", "first_name": null}))
                .unwrap();
        session.first_name = Some("Amaka".to_string());

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["first_name"], json!("Amaka"));
    }

    #[test]
    fn test_non_string_profile_field_kept_in_extra() {
        let original = json!({"id": "u1", "role": "user", "phone": 8_031_234_567_u64});
        let session: UserSession = serde_json::from_value(original.clone()).unwrap();
        assert!(session.phone.is_none());
        assert_eq!(serde_json::to_value(&session).unwrap(), original);
    }

    #[test]
    fn test_user_wallet_balance() {
        let original = json!({"id": "u1", "role": "user", "wallet_balance": 1500.5});
        let session: UserSession = serde_json::from_value(original.clone()).unwrap();

        match &session.account {
            Account::User { wallet_balance, .. } => {
                assert_eq!(*wallet_balance, Some(Decimal::new(15_005, 1)));
            }
            Account::Vendor { .. } => panic!("expected user account"),
        }
        assert!(session.extra().is_empty());
        assert_eq!(serde_json::to_value(&session).unwrap(), original);
    }

    #[test]
    fn test_whole_wallet_balance_stays_integral() {
        let original = json!({"id": "u1", "role": "user", "wallet_balance": 2000});
        let session: UserSession = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(serde_json::to_value(&session).unwrap(), original);
    }

    #[test]
    fn test_rejects_unknown_role() {
        let result = serde_json::from_value::<UserSession>(json!({"id": "u1", "role": "admin"}));
        assert!(result.unwrap_err().to_string().contains("unknown role: admin"));
    }

    #[test]
    fn test_rejects_missing_id() {
        let result = serde_json::from_value::<UserSession>(json!({"role": "user"}));
        assert!(result.unwrap_err().to_string().contains("missing field `id`"));
    }

    #[test]
    fn test_rejects_missing_role() {
        let result = serde_json::from_value::<UserSession>(json!({"id": "u1"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_numeric_id() {
        let result = serde_json::from_value::<UserSession>(json!({"id": 7, "role": "user"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut session = UserSession::user(UserId::parse("u9").unwrap());
        assert_eq!(session.display_name(), "u9");

        session.email = Some("u9@example.com".to_string());
        assert_eq!(session.display_name(), "u9@example.com");

        session.first_name = Some("Ngozi".to_string());
        assert_eq!(session.display_name(), "Ngozi");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("vendor".parse::<Role>().unwrap(), Role::Vendor);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::User.to_string(), "user");
    }
}
