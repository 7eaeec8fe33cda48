//! Client-side snapshot of server-authoritative session state.
//!
//! The server is the source of truth. The client only ever replaces the
//! session wholesale or shallow-merges a fragment returned by a mutation;
//! it never derives session fields locally.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub mod store;

pub use store::SessionStore;

/// Errors raised while applying a server-provided session fragment
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session fragment does not fit the session shape: {0}")]
    InvalidFragment(#[from] serde_json::Error),
    #[error("Session did not serialize to an object")]
    NotAnObject,
}

/// First onboarding step: name and address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStep1Info {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    #[serde(default)]
    pub borough: Option<String>,
    #[serde(default)]
    pub apt_number: String,
    /// Whether the server-geocoded address was accepted by the user
    #[serde(default)]
    pub address_verified: bool,
}

/// Second onboarding step: household situation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStep2Info {
    pub is_in_eviction: bool,
    pub needs_repairs: bool,
    pub has_no_services: bool,
    pub has_pests: bool,
    pub has_called_311: bool,
}

/// Third onboarding step: lease
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStep3Info {
    pub lease_type: String,
    #[serde(default)]
    pub receives_public_assistance: Option<bool>,
}

/// Onboarding record that exists once an account has been created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingInfo {
    pub signup_intent: String,
    #[serde(default)]
    pub agreed_to_justfix_terms: bool,
}

/// Scratch data for the NoRent letter flow, kept server-side before an
/// account exists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NorentScaffolding {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub apt_number: String,
    #[serde(default)]
    pub email: String,
    /// `None` until the city has been looked up
    #[serde(default)]
    pub is_city_in_nyc: Option<bool>,
}

/// The session as seen by the client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_email_verified: Option<bool>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_step1: Option<OnboardingStep1Info>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_step2: Option<OnboardingStep2Info>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_step3: Option<OnboardingStep3Info>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_info: Option<OnboardingInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norent_scaffolding: Option<NorentScaffolding>,
    #[serde(default)]
    pub active_feature_flags: Vec<String>,
    /// Session keys this client version does not model; preserved so that
    /// merges never drop server state.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Whether a user is logged in
    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn has_feature_flag(&self, flag: &str) -> bool {
        self.active_feature_flags.iter().any(|f| f == flag)
    }

    /// Return a copy with the fragment's top-level keys replacing ours
    pub fn merged(&self, update: &SessionUpdate) -> Result<Session, SessionError> {
        let mut value = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => return Err(SessionError::NotAnObject),
        };
        for (key, field) in update.iter() {
            value.insert(key.clone(), field.clone());
        }
        Ok(serde_json::from_value(Value::Object(value))?)
    }
}

/// A partial session returned by the server. Keys use the wire (camelCase)
/// names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionUpdate(Map<String, Value>);

impl SessionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a single key
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for SessionUpdate {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
