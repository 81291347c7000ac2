//! Read-only views: financial reports and the tenant's organisation.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{Date, OffsetDateTime, macros::format_description};

use crate::client::{ApiRequest, Client};
use crate::endpoints::XeroEndpoint;
use crate::entities::organisation::Organisation;
use crate::error::{Error, Result};
use crate::resource::Outcome;
use crate::utils::date_format::xero_datetime_format_option;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowType {
    Header,
    Section,
    Row,
    SummaryRow,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CellAttribute {
    pub id: Option<String>,
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportCell {
    /// Amounts arrive as formatted strings (`"1250.00"`), labels as text.
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<CellAttribute>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportRow {
    pub row_type: RowType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<ReportCell>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<ReportRow>,
}

impl ReportRow {
    /// Cell values of this row, in column order.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        self.cells.iter().map(|cell| cell.value.as_str()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Report {
    #[serde(rename = "ReportID")]
    pub report_id: Option<String>,
    pub report_name: Option<String>,
    pub report_type: Option<String>,
    #[serde(default)]
    pub report_titles: Vec<String>,
    /// Human formatted, e.g. `"31 March 2025"`.
    pub report_date: Option<String>,
    #[serde(rename = "UpdatedDateUTC", default, with = "xero_datetime_format_option")]
    pub updated_date_utc: Option<OffsetDateTime>,
    #[serde(default)]
    pub fields: Vec<Value>,
    #[serde(default)]
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// Finds a top level section by title, e.g. `"Bank"` on a balance sheet.
    #[must_use]
    pub fn section(&self, title: &str) -> Option<&ReportRow> {
        self.rows
            .iter()
            .find(|row| row.row_type == RowType::Section && row.title.as_deref() == Some(title))
    }
}

fn first_report(mut body: Map<String, Value>) -> Option<Value> {
    match body.remove("Reports") {
        Some(Value::Array(reports)) => reports.into_iter().next(),
        _ => None,
    }
}

/// Financial reports for one date. Each call fetches afresh.
#[derive(Debug)]
pub struct ReportsApi<'a> {
    client: &'a Client,
}

impl<'a> ReportsApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    async fn fetch(&self, endpoint: XeroEndpoint, date: Date) -> Result<Option<Value>> {
        let date = date
            .format(&format_description!("[year]-[month]-[day]"))
            .map_err(|e| Error::Configuration {
                name: "date",
                reason: e.to_string(),
            })?;
        let request = ApiRequest::new(Method::GET, endpoint).query("date", date);
        let result = self.client.send::<Map<String, Value>>(request).await;
        let report = Outcome::classify(result)?
            .into_option("report", "read")
            .and_then(first_report);
        if report.is_none() {
            debug!(%endpoint, "no report returned");
        }
        Ok(report)
    }

    async fn fetch_typed(&self, endpoint: XeroEndpoint, date: Date) -> Result<Option<Report>> {
        match self.fetch(endpoint, date).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn balance_sheet(&self, date: Date) -> Result<Option<Report>> {
        self.fetch_typed(XeroEndpoint::BalanceSheet, date).await
    }

    pub async fn trial_balance(&self, date: Date) -> Result<Option<Report>> {
        self.fetch_typed(XeroEndpoint::TrialBalance, date).await
    }

    /// The balance sheet as the plain nested mapping Xero returned.
    pub async fn balance_sheet_value(&self, date: Date) -> Result<Option<Value>> {
        self.fetch(XeroEndpoint::BalanceSheet, date).await
    }

    pub async fn trial_balance_value(&self, date: Date) -> Result<Option<Value>> {
        self.fetch(XeroEndpoint::TrialBalance, date).await
    }
}

#[derive(Debug)]
pub struct OrganisationsApi<'a> {
    client: &'a Client,
}

impl<'a> OrganisationsApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Organisation>> {
        let request = ApiRequest::new(Method::GET, XeroEndpoint::Organisations);
        let result = self.client.send::<Map<String, Value>>(request).await;
        let Some(mut body) = Outcome::classify(result)?.into_option("organisation", "list") else {
            return Ok(Vec::new());
        };
        match body.remove("Organisations") {
            Some(list) => Ok(serde_json::from_value(list)?),
            None => Ok(Vec::new()),
        }
    }
}
