use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::endpoints::XeroEndpoint;
use crate::entities::contact::Contact;
use crate::entities::line_item::{LineAmountType, LineItem};
use crate::resource::{DeleteStrategy, Resource};
use crate::utils::date_format::{xero_date_format_option, xero_datetime_format_option};
use crate::utils::serde_helpers::empty_string_as_none;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    #[serde(rename = "ACCPAY")]
    AccountsPayable,

    #[serde(rename = "ACCREC")]
    AccountsReceivable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Draft,
    Submitted,
    Deleted,
    Authorised,
    Paid,
    Voided,
}

impl Status {
    /// The status an invoice moves to when it is deleted. Drafts are deleted outright,
    /// approved invoices are voided, anything else stays as it is.
    #[must_use]
    pub fn deleted(self) -> Option<Self> {
        match self {
            Self::Draft => Some(Self::Deleted),
            Self::Authorised => Some(Self::Voided),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Invoice {
    #[serde(rename = "InvoiceID", skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<Type>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, with = "xero_date_format_option", skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(default, with = "xero_date_format_option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_amount_types: Option<LineAmountType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_total: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tax: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(
        rename = "BrandingThemeID",
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub branding_theme_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_to_contact: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_attachments: Option<bool>,
    #[serde(
        rename = "RepeatingInvoiceID",
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub repeating_invoice_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_due: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_credited: Option<Decimal>,
    #[serde(
        rename = "UpdatedDateUTC",
        default,
        with = "xero_datetime_format_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_date_utc: Option<OffsetDateTime>,
}

impl Invoice {
    /// A new draft invoice for `contact`.
    #[must_use]
    pub fn draft(r#type: Type, contact: Contact, line_items: Vec<LineItem>) -> Self {
        Self {
            r#type: Some(r#type),
            contact: Some(contact),
            status: Some(Status::Draft),
            line_items,
            ..Self::default()
        }
    }
}

impl Resource for Invoice {
    const NAME: &'static str = "invoice";
    const COLLECTION: &'static str = "Invoices";
    const DELETE_STRATEGY: DeleteStrategy = DeleteStrategy::SoftDelete;
    const USES_UNITDP: bool = true;

    fn collection_endpoint() -> XeroEndpoint {
        XeroEndpoint::Invoices
    }

    fn entity_endpoint(id: Uuid) -> XeroEndpoint {
        XeroEndpoint::Invoice(id)
    }

    fn id(&self) -> Option<Uuid> {
        self.invoice_id
    }

    fn soft_delete(&mut self) -> bool {
        match self.status.and_then(Status::deleted) {
            Some(next) => {
                self.status = Some(next);
                true
            }
            None => false,
        }
    }
}
