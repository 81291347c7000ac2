use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::utils::date_format::xero_datetime_format_option;

/// The organisation behind the tenant. Read-only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Organisation {
    #[serde(rename = "OrganisationID")]
    pub organisation_id: Option<Uuid>,
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub short_code: Option<String>,
    pub organisation_type: Option<String>,
    pub organisation_status: Option<String>,
    pub base_currency: Option<String>,
    pub country_code: Option<String>,
    pub timezone: Option<String>,
    pub pays_tax: Option<bool>,
    pub is_demo_company: Option<bool>,
    pub version: Option<String>,
    pub edition: Option<String>,
    pub class: Option<String>,
    pub financial_year_end_day: Option<u8>,
    pub financial_year_end_month: Option<u8>,
    #[serde(rename = "CreatedDateUTC", default, with = "xero_datetime_format_option")]
    pub created_date_utc: Option<OffsetDateTime>,
}
