use anyhow::Result;
use rust_decimal_macros::dec;
use serde_json::json;
use time::macros::date;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};
use xero_adapter::entities::invoice::Type;
use xero_adapter::entities::repeating_invoice::{DueDateType, ScheduleUnit, Status};
use xero_adapter::{Contact, Error, LineItem, RepeatingInvoice, Schedule, Selector};

use test_utils::{EchoCollection, MockXero};

fn monthly_template() -> RepeatingInvoice {
    RepeatingInvoice {
        r#type: Some(Type::AccountsReceivable),
        contact: Some(Contact::with_id(Uuid::new_v4())),
        schedule: Some(Schedule {
            period: Some(1),
            unit: Some(ScheduleUnit::Monthly),
            due_date: Some(20),
            due_date_type: Some(DueDateType::OfFollowingMonth),
            start_date: Some(date!(2025 - 04 - 01)),
            ..Schedule::default()
        }),
        line_items: vec![LineItem::new("Hosting", dec!(1), dec!(49.00), "200")],
        status: Some(Status::Draft),
        ..RepeatingInvoice::default()
    }
}

#[tokio::test]
async fn create_template() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    Mock::given(method("PUT"))
        .and(path(MockXero::api_path("RepeatingInvoices")))
        .respond_with(EchoCollection {
            collection: "RepeatingInvoices",
            id_field: "RepeatingInvoiceID",
        })
        .expect(1)
        .mount(&xero.server)
        .await;

    let created = adapter
        .repeating_invoices()?
        .create(vec![monthly_template()])
        .await?;

    assert!(created[0].repeating_invoice_id.is_some());
    assert_eq!(
        created[0].schedule.as_ref().and_then(|s| s.unit),
        Some(ScheduleUnit::Monthly)
    );
    Ok(())
}

#[tokio::test]
async fn update_is_refused_without_a_call() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&xero.server)
        .await;

    let mut template = monthly_template();
    template.repeating_invoice_id = Some(Uuid::new_v4());
    let result = adapter.repeating_invoices()?.update(vec![template]).await;

    assert!(matches!(
        result,
        Err(Error::Unsupported {
            operation: "update",
            ..
        })
    ));
    Ok(())
}

#[tokio::test]
async fn delete_posts_deleted_status() -> Result<()> {
    let xero = MockXero::start().await;
    let adapter = xero.connected().await?;
    let id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path(MockXero::api_path(&format!("RepeatingInvoices/{id}"))))
        .and(body_json(json!({ "Status": "DELETED" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "RepeatingInvoices": [{ "RepeatingInvoiceID": id, "Status": "DELETED" }]
        })))
        .expect(1)
        .mount(&xero.server)
        .await;

    let mut template = monthly_template();
    template.repeating_invoice_id = Some(id);
    let deleted = adapter
        .repeating_invoices()?
        .delete(Selector::ByList(vec![template]))
        .await?;

    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].status, Some(Status::Deleted));
    Ok(())
}
