use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::endpoints::XeroEndpoint;
use crate::entities::contact::Contact;
use crate::entities::invoice::Type;
use crate::entities::line_item::{LineAmountType, LineItem};
use crate::resource::{DeleteStrategy, Resource};
use crate::utils::date_format::xero_date_format_option;
use crate::utils::serde_helpers::empty_string_as_none;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Draft,
    Authorised,
    Deleted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScheduleUnit {
    Weekly,
    Monthly,
}

/// How `Schedule::due_date` is counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DueDateType {
    DaysAfterBillDate,
    DaysAfterBillMonth,
    OfCurrentMonth,
    OfFollowingMonth,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Schedule {
    /// Number of `unit`s between invoices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<ScheduleUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date_type: Option<DueDateType>,
    #[serde(default, with = "xero_date_format_option", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,
    #[serde(default, with = "xero_date_format_option", skip_serializing_if = "Option::is_none")]
    pub next_scheduled_date: Option<Date>,
    #[serde(default, with = "xero_date_format_option", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
}

/// A template Xero turns into invoices on a schedule.
///
/// Xero accepts new templates but this adapter cannot change existing ones, so
/// [`ResourceApi::update`](crate::resource::ResourceApi::update) refuses them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepeatingInvoice {
    #[serde(rename = "RepeatingInvoiceID", skip_serializing_if = "Option::is_none")]
    pub repeating_invoice_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<Type>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_amount_types: Option<LineAmountType>,
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
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_total: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tax: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_attachments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_for_sending: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_copy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_as_sent: Option<bool>,
    #[serde(rename = "IncludePDF", skip_serializing_if = "Option::is_none")]
    pub include_pdf: Option<bool>,
}

impl Resource for RepeatingInvoice {
    const NAME: &'static str = "repeating invoice";
    const COLLECTION: &'static str = "RepeatingInvoices";
    const DELETE_STRATEGY: DeleteStrategy = DeleteStrategy::StatusDelete;
    const SUPPORTS_UPDATE: bool = false;

    fn collection_endpoint() -> XeroEndpoint {
        XeroEndpoint::RepeatingInvoices
    }

    fn entity_endpoint(id: Uuid) -> XeroEndpoint {
        XeroEndpoint::RepeatingInvoice(id)
    }

    fn id(&self) -> Option<Uuid> {
        self.repeating_invoice_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn schedule_uses_xero_spelling() {
        let schedule = Schedule {
            period: Some(1),
            unit: Some(ScheduleUnit::Weekly),
            due_date: Some(10),
            due_date_type: Some(DueDateType::DaysAfterBillDate),
            start_date: Some(date!(2025 - 02 - 03)),
            ..Schedule::default()
        };

        let value = serde_json::to_value(&schedule).unwrap();
        assert_eq!(value["Unit"], "WEEKLY");
        assert_eq!(value["DueDateType"], "DAYSAFTERBILLDATE");
        assert_eq!(value["StartDate"], "2025-02-03");
        assert!(value.get("NextScheduledDate").is_none());
    }

    #[test]
    fn blank_branding_theme_reads_as_none() {
        let template: RepeatingInvoice = serde_json::from_value(serde_json::json!({
            "RepeatingInvoiceID": "6bd0b4e6-5f3b-4ad4-8ef7-1a2b3c4d5e6f",
            "BrandingThemeID": "",
            "Status": "AUTHORISED"
        }))
        .unwrap();

        assert!(template.branding_theme_id.is_none());
        assert_eq!(template.status, Some(Status::Authorised));
    }
}
