use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::endpoints::XeroEndpoint;
use crate::entities::invoice::Invoice;
use crate::resource::{DeleteStrategy, Resource};
use crate::utils::date_format::{xero_date_format_option, xero_datetime_format_option};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Authorised,
    Deleted,
}

/// The bank account a payment is made from or into.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountReference {
    #[serde(rename = "AccountID", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Payment {
    #[serde(rename = "PaymentID", skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountReference>,
    #[serde(default, with = "xero_date_format_option", skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_reconciled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
    #[serde(
        rename = "UpdatedDateUTC",
        default,
        with = "xero_datetime_format_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_date_utc: Option<OffsetDateTime>,
}

impl Payment {
    /// Pays `amount` of one invoice from one account, dated today.
    #[must_use]
    pub fn for_invoice(invoice_id: Uuid, account_id: Uuid, amount: Decimal) -> Self {
        Self {
            invoice: Some(Invoice {
                invoice_id: Some(invoice_id),
                ..Invoice::default()
            }),
            account: Some(AccountReference {
                account_id: Some(account_id),
                ..AccountReference::default()
            }),
            date: Some(OffsetDateTime::now_utc().date()),
            amount: Some(amount),
            ..Self::default()
        }
    }
}

impl Resource for Payment {
    const NAME: &'static str = "payment";
    const COLLECTION: &'static str = "Payments";
    const DELETE_STRATEGY: DeleteStrategy = DeleteStrategy::StatusDelete;

    fn collection_endpoint() -> XeroEndpoint {
        XeroEndpoint::Payments
    }

    fn entity_endpoint(id: Uuid) -> XeroEndpoint {
        XeroEndpoint::Payment(id)
    }

    fn id(&self) -> Option<Uuid> {
        self.payment_id
    }
}
