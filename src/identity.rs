//! Session identity decoded from transport parameters.

use serde_json::{Map, Value};

use crate::delta::json_type_name;
use crate::error::IdentityError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

/// How a non-string JSON parameter is turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Strings as-is; numbers and booleans by their textual form; `null` as absent.
    WeakScalar,
}

/// Schema entry for one identity parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityField {
    pub name: &'static str,
    pub requirement: Requirement,
    pub coercion: Coercion,
}

pub const SESSION_ID_PARAM: &str = "session_id";
pub const APP_NAME_PARAM: &str = "app_name";
pub const USER_ID_PARAM: &str = "user_id";

/// Identity parameters in the order they are validated.
pub const IDENTITY_SCHEMA: [IdentityField; 3] = [
    IdentityField {
        name: SESSION_ID_PARAM,
        requirement: Requirement::Optional,
        coercion: Coercion::WeakScalar,
    },
    IdentityField {
        name: APP_NAME_PARAM,
        requirement: Requirement::Required,
        coercion: Coercion::WeakScalar,
    },
    IdentityField {
        name: USER_ID_PARAM,
        requirement: Requirement::Required,
        coercion: Coercion::WeakScalar,
    },
];

impl IdentityField {
    fn coerce(&self, value: &Value) -> Result<Option<String>, IdentityError> {
        match (self.coercion, value) {
            (Coercion::WeakScalar, Value::Null) => Ok(None),
            (Coercion::WeakScalar, Value::String(text)) => Ok(Some(text.clone())),
            (Coercion::WeakScalar, Value::Number(number)) => Ok(Some(number.to_string())),
            (Coercion::WeakScalar, Value::Bool(flag)) => Ok(Some(flag.to_string())),
            (Coercion::WeakScalar, other) => Err(IdentityError::InvalidType {
                field: self.name,
                found: json_type_name(other),
            }),
        }
    }
}

/// `(session_id, app_name, user_id)` identifying a session externally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SessionIdentity {
    session_id: String,
    app_name: String,
    user_id: String,
}

impl SessionIdentity {
    /// Builds an identity without a session id.
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        Self::from_values(String::new(), app_name.into(), user_id.into())
    }

    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Decodes identity from a string-to-string transport map such as path variables.
    pub fn from_http_parameters<'a, I>(params: I) -> Result<Self, IdentityError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut decoded: [String; 3] = Default::default();
        for (name, value) in params {
            if let Some(slot) = schema_slot(name) {
                decoded[slot] = value.to_string();
            }
        }
        let [session_id, app_name, user_id] = decoded;
        Self::from_values(session_id, app_name, user_id)
    }

    /// Decodes identity from a JSON object, weakly coercing scalar values to text.
    pub fn from_json_parameters(params: &Map<String, Value>) -> Result<Self, IdentityError> {
        let mut decoded: [String; 3] = Default::default();
        for (slot, field) in IDENTITY_SCHEMA.iter().enumerate() {
            if let Some(value) = params.get(field.name) {
                decoded[slot] = field.coerce(value)?.unwrap_or_default();
            }
        }
        let [session_id, app_name, user_id] = decoded;
        Self::from_values(session_id, app_name, user_id)
    }

    fn from_values(
        session_id: String,
        app_name: String,
        user_id: String,
    ) -> Result<Self, IdentityError> {
        let decoded = [&session_id, &app_name, &user_id];
        for (field, value) in IDENTITY_SCHEMA.iter().zip(decoded) {
            if field.requirement == Requirement::Required && value.is_empty() {
                return Err(IdentityError::MissingParameter { field: field.name });
            }
        }

        Ok(Self {
            session_id,
            app_name,
            user_id,
        })
    }

    /// The session id, or `None` when the caller supplied none.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        (!self.session_id.is_empty()).then_some(self.session_id.as_str())
    }

    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

fn schema_slot(name: &str) -> Option<usize> {
    IDENTITY_SCHEMA.iter().position(|field| field.name == name)
}
