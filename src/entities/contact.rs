use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::endpoints::XeroEndpoint;
use crate::resource::{DeleteStrategy, Resource};
use crate::utils::date_format::xero_datetime_format_option;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Active,
    Archived,
    GdprRequest,
}

impl Status {
    /// Contacts are never removed, only archived.
    #[must_use]
    pub fn deleted(self) -> Option<Self> {
        match self {
            Self::Active => Some(Self::Archived),
            Self::Archived | Self::GdprRequest => None,
        }
    }
}

/// A customer or supplier. Also used as the contact reference on invoices, where
/// only `contact_id` (or `name`) needs to be set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Contact {
    #[serde(rename = "ContactID", skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_supplier: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_customer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<String>,
    #[serde(
        rename = "UpdatedDateUTC",
        default,
        with = "xero_datetime_format_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_date_utc: Option<OffsetDateTime>,
}

impl Contact {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// A bare reference to an existing contact.
    #[must_use]
    pub fn with_id(contact_id: Uuid) -> Self {
        Self {
            contact_id: Some(contact_id),
            ..Self::default()
        }
    }
}

impl Resource for Contact {
    const NAME: &'static str = "contact";
    const COLLECTION: &'static str = "Contacts";
    const DELETE_STRATEGY: DeleteStrategy = DeleteStrategy::SoftDelete;

    fn collection_endpoint() -> XeroEndpoint {
        XeroEndpoint::Contacts
    }

    fn entity_endpoint(id: Uuid) -> XeroEndpoint {
        XeroEndpoint::Contact(id)
    }

    fn id(&self) -> Option<Uuid> {
        self.contact_id
    }

    fn soft_delete(&mut self) -> bool {
        match self.contact_status.and_then(Status::deleted) {
            Some(next) => {
                self.contact_status = Some(next);
                true
            }
            None => false,
        }
    }
}
