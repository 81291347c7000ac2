use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::endpoints::XeroEndpoint;
use crate::entities::line_item::{LineAmountType, TrackingSummary};
use crate::resource::{DeleteStrategy, Resource};
use crate::utils::date_format::{xero_date_format_option, xero_datetime_format_option};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Draft,
    Posted,
    Deleted,
    Voided,
    Archived,
}

impl Status {
    #[must_use]
    pub fn deleted(self) -> Option<Self> {
        match self {
            Self::Draft => Some(Self::Deleted),
            Self::Posted => Some(Self::Voided),
            _ => None,
        }
    }
}

/// One debit (positive) or credit (negative) line. The lines of a journal must balance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JournalLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_code: Option<String>,
    #[serde(rename = "AccountID", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracking: Vec<TrackingSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_blank: Option<bool>,
}

impl JournalLine {
    #[must_use]
    pub fn new(account_code: impl Into<String>, line_amount: Decimal) -> Self {
        Self {
            account_code: Some(account_code.into()),
            line_amount: Some(line_amount),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManualJournal {
    #[serde(rename = "ManualJournalID", skip_serializing_if = "Option::is_none")]
    pub manual_journal_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub journal_lines: Vec<JournalLine>,
    #[serde(default, with = "xero_date_format_option", skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_amount_types: Option<LineAmountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_on_cash_basis_reports: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_attachments: Option<bool>,
    #[serde(
        rename = "UpdatedDateUTC",
        default,
        with = "xero_datetime_format_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_date_utc: Option<OffsetDateTime>,
}

impl ManualJournal {
    #[must_use]
    pub fn new(narration: impl Into<String>, date: Date, journal_lines: Vec<JournalLine>) -> Self {
        Self {
            narration: Some(narration.into()),
            date: Some(date),
            journal_lines,
            ..Self::default()
        }
    }
}

impl Resource for ManualJournal {
    const NAME: &'static str = "manual journal";
    const COLLECTION: &'static str = "ManualJournals";
    const DELETE_STRATEGY: DeleteStrategy = DeleteStrategy::SoftDelete;

    fn collection_endpoint() -> XeroEndpoint {
        XeroEndpoint::ManualJournals
    }

    fn entity_endpoint(id: Uuid) -> XeroEndpoint {
        XeroEndpoint::ManualJournal(id)
    }

    fn id(&self) -> Option<Uuid> {
        self.manual_journal_id
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
