use anyhow::Result;
use serde_json::{json, Value};
use time::macros::date;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};
use xero_adapter::report::RowType;

use test_utils::MockXero;

fn balance_sheet() -> Value {
    json!({
        "Reports": [{
            "ReportID": "BalanceSheet",
            "ReportName": "Balance Sheet",
            "ReportType": "BalanceSheet",
            "ReportTitles": ["Balance Sheet", "Demo Company (NZ)", "As at 31 March 2025"],
            "ReportDate": "31 March 2025",
            "UpdatedDateUTC": "/Date(1743400000000+0000)/",
            "Fields": [],
            "Rows": [
                { "RowType": "Header", "Cells": [{ "Value": "" }, { "Value": "31 Mar 2025" }] },
                {
                    "RowType": "Section",
                    "Title": "Bank",
                    "Rows": [
                        { "RowType": "Row", "Cells": [{ "Value": "Business Bank Account" }, { "Value": "2050.25" }] },
                        { "RowType": "SummaryRow", "Cells": [{ "Value": "Total Bank" }, { "Value": "2050.25" }] }
                    ]
                }
            ]
        }]
    })
}

#[tokio::test]
async fn balance_sheet_for_a_date() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    Mock::given(method("GET"))
        .and(path(MockXero::api_path("Reports/BalanceSheet")))
        .and(query_param("date", "2025-03-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(balance_sheet()))
        .expect(2)
        .mount(&xero.server)
        .await;

    let reports = adapter.reports()?;
    let report = reports
        .balance_sheet(date!(2025 - 03 - 31))
        .await?
        .expect("report returned");

    assert_eq!(report.report_name.as_deref(), Some("Balance Sheet"));
    assert_eq!(report.rows[0].row_type, RowType::Header);
    let bank = report.section("Bank").expect("bank section");
    assert_eq!(bank.rows[1].values(), vec!["Total Bank", "2050.25"]);

    // Every call fetches afresh.
    let value = reports
        .balance_sheet_value(date!(2025 - 03 - 31))
        .await?
        .expect("report returned");
    assert_eq!(value["Rows"][1]["Title"], "Bank");
    Ok(())
}

#[tokio::test]
async fn trial_balance_as_plain_value() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    Mock::given(method("GET"))
        .and(path(MockXero::api_path("Reports/TrialBalance")))
        .and(query_param("date", "2024-12-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Reports": [{ "ReportID": "TrialBalance", "ReportName": "Trial Balance", "Rows": [] }]
        })))
        .expect(2)
        .mount(&xero.server)
        .await;

    let reports = adapter.reports()?;
    let value = reports
        .trial_balance_value(date!(2024 - 12 - 31))
        .await?
        .expect("report returned");
    assert_eq!(value["ReportName"], "Trial Balance");

    let report = reports.trial_balance(date!(2024 - 12 - 31)).await?.unwrap();
    assert!(report.rows.is_empty());
    Ok(())
}

#[tokio::test]
async fn rejected_report_is_none() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    Mock::given(method("GET"))
        .and(path(MockXero::api_path("Reports/BalanceSheet")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ErrorNumber": 16,
            "Type": "QueryParseException",
            "Message": "Invalid date"
        })))
        .expect(1)
        .mount(&xero.server)
        .await;

    assert!(
        adapter
            .reports()?
            .balance_sheet(date!(1900 - 01 - 01))
            .await?
            .is_none()
    );
    Ok(())
}

#[tokio::test]
async fn organisations_are_listed() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    Mock::given(method("GET"))
        .and(path(MockXero::api_path("Organisations")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Organisations": [{
                "OrganisationID": "b2c885a9-4bb9-4a00-9b6e-6c2bf60b1a2b",
                "Name": "Demo Company (NZ)",
                "BaseCurrency": "NZD",
                "CountryCode": "NZ",
                "IsDemoCompany": true,
                "FinancialYearEndDay": 31,
                "FinancialYearEndMonth": 3,
                "CreatedDateUTC": "/Date(1700000000000)/"
            }]
        })))
        .expect(1)
        .mount(&xero.server)
        .await;

    let organisations = adapter.organisations()?.list().await?;

    assert_eq!(organisations.len(), 1);
    assert_eq!(organisations[0].is_demo_company, Some(true));
    assert_eq!(organisations[0].financial_year_end_month, Some(3));
    assert!(organisations[0].created_date_utc.is_some());
    Ok(())
}
