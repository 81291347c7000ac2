use anyhow::Result;
use rust_decimal_macros::dec;
use serde_json::json;
use time::macros::datetime;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};
use xero_adapter::entities::invoice::{Status, Type};
use xero_adapter::utils::date_format::where_date;
use xero_adapter::{Contact, Error, Filter, Invoice, LineItem, Selector};

use test_utils::{validation_error, EchoCollection, MockXero, TENANT_ID};

fn draft_invoice(reference: &str) -> Invoice {
    let mut invoice = Invoice::draft(
        Type::AccountsReceivable,
        Contact::with_id(Uuid::new_v4()),
        vec![LineItem::new("Consulting", dec!(2), dec!(150.00), "200")],
    );
    invoice.reference = Some(reference.to_string());
    invoice
}

async fn mount_echo(xero: &MockXero, verb: &str) {
    Mock::given(method(verb))
        .and(path(MockXero::api_path("Invoices")))
        .respond_with(EchoCollection {
            collection: "Invoices",
            id_field: "InvoiceID",
        })
        .mount(&xero.server)
        .await;
}

#[tokio::test]
async fn create_then_update_keeps_identity() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    mount_echo(&xero, "PUT").await;
    mount_echo(&xero, "POST").await;

    let created = adapter.invoices()?.create(vec![draft_invoice("test")]).await?;
    assert_eq!(created.len(), 1);
    let id = created[0].invoice_id.expect("xero assigns an id");

    let mut changed = created[0].clone();
    changed.reference = Some("changed".to_string());
    let updated = adapter.invoices()?.update(vec![changed]).await?;

    assert_eq!(updated[0].invoice_id, Some(id));
    assert_eq!(updated[0].reference.as_deref(), Some("changed"));
    Ok(())
}

#[tokio::test]
async fn calls_carry_tenant_and_decimal_places() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    Mock::given(method("PUT"))
        .and(path(MockXero::api_path("Invoices")))
        .and(header("Xero-tenant-id", TENANT_ID))
        .and(header("Authorization", "Bearer valid-access"))
        .and(query_param("unitdp", "4"))
        .and(body_partial_json(json!({
            "Invoices": [{ "Type": "ACCREC", "Status": "DRAFT", "Reference": "test" }]
        })))
        .respond_with(EchoCollection {
            collection: "Invoices",
            id_field: "InvoiceID",
        })
        .expect(1)
        .mount(&xero.server)
        .await;

    let created = adapter.invoices()?.create(vec![draft_invoice("test")]).await?;
    assert_eq!(created.len(), 1);
    Ok(())
}

#[tokio::test]
async fn creating_nothing_sends_nothing() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&xero.server)
        .await;

    assert!(adapter.invoices()?.create(Vec::new()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn read_of_missing_id_is_none() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    let id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(MockXero::api_path(&format!("Invoices/{id}"))))
        .respond_with(ResponseTemplate::new(404).set_body_string("The resource you're looking for cannot be found"))
        .expect(1)
        .mount(&xero.server)
        .await;

    assert!(adapter.invoices()?.read(id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn list_passes_filter_through() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    let clause = format!(
        "Status==\"DRAFT\" AND Date>={}",
        where_date(time::macros::date!(2025 - 01 - 31))
    );
    Mock::given(method("GET"))
        .and(path(MockXero::api_path("Invoices")))
        .and(query_param("where", clause.as_str()))
        .and(query_param("order", "Date DESC"))
        .and(header("If-Modified-Since", "2025-02-01T08:30:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Invoices": [{
                "InvoiceID": "243216c5-369e-4056-ac67-05388f86dc81",
                "Type": "ACCREC",
                "Status": "DRAFT",
                "Reference": "test",
                "Date": "/Date(1738281600000+0000)/",
                "BrandingThemeID": "",
                "UpdatedDateUTC": "/Date(1738398600000+0000)/"
            }]
        })))
        .expect(1)
        .mount(&xero.server)
        .await;

    let filter = Filter::new()
        .with_where(clause.clone())
        .with_order("Date DESC")
        .modified_since(datetime!(2025-02-01 08:30:00 UTC));
    let invoices = adapter.invoices()?.list(&filter).await?;

    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].status, Some(Status::Draft));
    assert_eq!(invoices[0].date, Some(time::macros::date!(2025 - 01 - 31)));
    assert!(invoices[0].branding_theme_id.is_none());
    Ok(())
}

#[tokio::test]
async fn delete_by_id_marks_draft_deleted() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    mount_echo(&xero, "PUT").await;
    let created = adapter.invoices()?.create(vec![draft_invoice("test")]).await?;
    let id = created[0].invoice_id.unwrap();

    Mock::given(method("GET"))
        .and(path(MockXero::api_path(&format!("Invoices/{id}"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Invoices": [{ "InvoiceID": id, "Type": "ACCREC", "Status": "DRAFT", "Reference": "test" }]
        })))
        .mount(&xero.server)
        .await;
    Mock::given(method("POST"))
        .and(path(MockXero::api_path("Invoices")))
        .and(body_partial_json(json!({ "Invoices": [{ "Status": "DELETED" }] })))
        .respond_with(EchoCollection {
            collection: "Invoices",
            id_field: "InvoiceID",
        })
        .expect(1)
        .mount(&xero.server)
        .await;

    let deleted = adapter.invoices()?.delete(Selector::ById(id)).await?;

    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].invoice_id, Some(id));
    assert_eq!(deleted[0].status, Some(Status::Deleted));
    assert_eq!(deleted[0].reference.as_deref(), Some("test"));
    Ok(())
}

#[tokio::test]
async fn delete_voids_authorised_and_leaves_paid_alone() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    mount_echo(&xero, "POST").await;

    let authorised = Invoice {
        invoice_id: Some(Uuid::new_v4()),
        status: Some(Status::Authorised),
        ..Invoice::default()
    };
    let paid = Invoice {
        invoice_id: Some(Uuid::new_v4()),
        status: Some(Status::Paid),
        ..Invoice::default()
    };

    let deleted = adapter
        .invoices()?
        .delete(Selector::ByList(vec![authorised, paid]))
        .await?;

    assert_eq!(deleted[0].status, Some(Status::Voided));
    assert_eq!(deleted[1].status, Some(Status::Paid));
    Ok(())
}

#[tokio::test]
async fn delete_skips_invoices_without_id() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    Mock::given(method("POST"))
        .and(path(MockXero::api_path("Invoices")))
        .respond_with(EchoCollection {
            collection: "Invoices",
            id_field: "InvoiceID",
        })
        .expect(1)
        .mount(&xero.server)
        .await;

    let id = Uuid::new_v4();
    let existing = Invoice {
        invoice_id: Some(id),
        ..draft_invoice("INV-EXISTING")
    };
    let deleted = adapter
        .invoices()?
        .delete(Selector::ByList(vec![draft_invoice("INV-NEW"), existing]))
        .await?;

    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].invoice_id, Some(id));
    assert_eq!(deleted[0].status, Some(Status::Deleted));

    // Nothing with an id left, so no request at all.
    let deleted = adapter
        .invoices()?
        .delete(Selector::ByList(vec![draft_invoice("INV-NEW")]))
        .await?;
    assert!(deleted.is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_matching_nothing_sends_no_update() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    Mock::given(method("GET"))
        .and(path(MockXero::api_path("Invoices")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Invoices": [] })))
        .expect(1)
        .mount(&xero.server)
        .await;
    Mock::given(method("POST"))
        .and(path(MockXero::api_path("Invoices")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&xero.server)
        .await;

    let filter = Filter::new().with_where("Reference==\"nothing\"");
    let deleted = adapter.invoices()?.delete(Selector::ByFilter(filter)).await?;

    assert!(deleted.is_empty());
    Ok(())
}

#[tokio::test]
async fn rejected_create_comes_back_empty() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    Mock::given(method("PUT"))
        .and(path(MockXero::api_path("Invoices")))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(validation_error("Account code '999' is not a valid code")),
        )
        .expect(1)
        .mount(&xero.server)
        .await;

    let created = adapter.invoices()?.create(vec![draft_invoice("test")]).await?;

    assert!(created.is_empty());
    Ok(())
}

#[tokio::test]
async fn server_errors_propagate() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    Mock::given(method("GET"))
        .and(path(MockXero::api_path("Invoices")))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&xero.server)
        .await;

    let result = adapter.invoices()?.list_all().await;

    match result {
        Err(Error::UnexpectedStatus { status_code, .. }) => assert_eq!(status_code.as_u16(), 503),
        other => panic!("expected an unexpected status error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn rate_limit_is_surfaced_not_retried() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    Mock::given(method("GET"))
        .and(path(MockXero::api_path("Invoices")))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "30")
                .insert_header("X-Rate-Limit-Problem", "minute"),
        )
        .expect(1)
        .mount(&xero.server)
        .await;

    let result = adapter.invoices()?.list_all().await;

    match result {
        Err(Error::RateLimitExceeded { retry_after, .. }) => {
            assert_eq!(retry_after, Some(std::time::Duration::from_secs(30)));
        }
        other => panic!("expected a rate limit error, got {other:?}"),
    }
    Ok(())
}
