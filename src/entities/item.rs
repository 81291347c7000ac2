use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::endpoints::XeroEndpoint;
use crate::error::ValidationError;
use crate::resource::{DeleteStrategy, Resource};
use crate::utils::date_format::xero_datetime_format_option;

/// How the item is bought.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PurchaseDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    /// Expense account for untracked items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_code: Option<String>,

    /// Cost of goods sold account, used instead of `account_code` once the item is tracked.
    #[serde(rename = "COGSAccountCode", skip_serializing_if = "Option::is_none")]
    pub cogs_account_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<String>,
}

/// A product or service, optionally tracked as inventory.
///
/// Items are removed outright rather than archived.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    #[serde(rename = "ItemID", skip_serializing_if = "Option::is_none")]
    pub item_id: Option<Uuid>,

    /// Unique per organisation; other documents refer to the item by it.
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Printed on sales documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_details: Option<PurchaseDetails>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_details: Option<SalesDetails>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_tracked_as_inventory: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_asset_account_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost_pool: Option<Decimal>,

    /// Only reported for tracked items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_on_hand: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_sold: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_purchased: Option<bool>,

    #[serde(
        rename = "UpdatedDateUTC",
        default,
        with = "xero_datetime_format_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_date_utc: Option<OffsetDateTime>,

    /// Filled in on items Xero refused; never sent.
    #[serde(default, skip_serializing)]
    pub validation_errors: Vec<ValidationError>,
}

impl Item {
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Resource for Item {
    const NAME: &'static str = "item";
    const COLLECTION: &'static str = "Items";
    const DELETE_STRATEGY: DeleteStrategy = DeleteStrategy::HardDelete;
    const USES_UNITDP: bool = true;

    fn collection_endpoint() -> XeroEndpoint {
        XeroEndpoint::Items
    }

    fn entity_endpoint(id: Uuid) -> XeroEndpoint {
        XeroEndpoint::Item(id)
    }

    fn id(&self) -> Option<Uuid> {
        self.item_id
    }
}
