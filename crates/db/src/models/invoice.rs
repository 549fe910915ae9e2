//! Invoice and line item models.

use chrono::NaiveDate;
use portal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `invoices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub organization_id: DbId,
    pub project_id: Option<DbId>,
    pub number: String,
    pub status: String,
    pub issued_at: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub paid_at: Option<Timestamp>,
    pub notes: Option<String>,
    pub tax_rate_bps: i32,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `invoice_line_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InvoiceLineItem {
    pub id: DbId,
    pub invoice_id: DbId,
    pub description: String,
    pub quantity: f64,
    pub unit_price_cents: i64,
    pub amount_cents: i64,
    pub position: i32,
}

/// Invoice with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub line_items: Vec<InvoiceLineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoice {
    pub organization_id: DbId,
    pub project_id: Option<DbId>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[serde(default)]
    pub tax_rate_bps: i32,
    #[serde(default)]
    pub line_items: Vec<CreateLineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInvoiceStatus {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceListParams {
    pub status: Option<String>,
    pub organization_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
