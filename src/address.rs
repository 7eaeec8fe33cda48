//! Reconciling a typed address with the server's geocoded one

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::{StorageBackend, VersionedStorage};

/// Storage key of the pending confirmation
pub const ADDRESS_CONFIRMATION_KEY: &str = "address-confirmation";
const ADDRESS_CONFIRMATION_VERSION: u32 = 1;

/// The parts of an address that decide whether a confirmation step is needed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressFields {
    pub address: String,
    #[serde(default)]
    pub borough: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl AddressFields {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_borough(mut self, borough: impl Into<String>) -> Self {
        self.borough = Some(borough.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}

fn normalize_street(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Street addresses match ignoring case and surrounding whitespace;
/// borough, city and state must match exactly.
pub fn are_addresses_the_same(a: &AddressFields, b: &AddressFields) -> bool {
    normalize_street(&a.address) == normalize_street(&b.address)
        && a.borough == b.borough
        && a.city == b.city
        && a.state == b.state
}

/// Pick the route to go to after the server geocoded `input` as `resolved`
pub fn redirect_to_address_confirmation_or_next_step<'a>(
    input: &AddressFields,
    resolved: &AddressFields,
    confirmation_route: &'a str,
    next_step_route: &'a str,
) -> &'a str {
    if are_addresses_the_same(input, resolved) {
        next_step_route
    } else {
        confirmation_route
    }
}

/// Typed and geocoded addresses, kept for the confirmation page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressConfirmation {
    pub input: AddressFields,
    pub resolved: AddressFields,
}

impl AddressConfirmation {
    pub fn needs_confirmation(&self) -> bool {
        !are_addresses_the_same(&self.input, &self.resolved)
    }
}

/// Storage slot holding the confirmation between the address step and the
/// confirmation page
pub fn address_confirmation_storage(
    backend: Arc<dyn StorageBackend>,
) -> VersionedStorage<Option<AddressConfirmation>> {
    VersionedStorage::new(
        backend,
        ADDRESS_CONFIRMATION_KEY,
        ADDRESS_CONFIRMATION_VERSION,
    )
}
