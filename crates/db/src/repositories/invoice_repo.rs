//! Repository for `invoices` and `invoice_line_items`.

use chrono::Datelike;
use portal_core::invoice::{format_invoice_number, InvoiceTotals};
use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::invoice::{CreateInvoice, Invoice, InvoiceDetail, InvoiceLineItem};

const COLUMNS: &str = "id, organization_id, project_id, number, status, issued_at, due_date, \
                       paid_at, notes, tax_rate_bps, subtotal_cents, tax_cents, total_cents, \
                       created_at, updated_at";

const LINE_COLUMNS: &str =
    "id, invoice_id, description, quantity, unit_price_cents, amount_cents, position";

/// Advisory lock key serializing invoice number allocation.
const NUMBER_LOCK_KEY: i64 = 0x1_4E_56_01;

pub struct InvoiceRepo;

impl InvoiceRepo {
    /// Insert an invoice and its line items in one transaction.
    ///
    /// `line_amounts` holds the precomputed amount for each entry of
    /// `input.line_items`, in order. The invoice number is the next sequence
    /// for the current year.
    pub async fn create(
        pool: &PgPool,
        input: &CreateInvoice,
        line_amounts: &[i64],
        totals: &InvoiceTotals,
    ) -> Result<InvoiceDetail, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(NUMBER_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let year = chrono::Utc::now().year();
        let prefix = format!("INV-{year}-%");
        let last: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(CAST(split_part(number, '-', 3) AS BIGINT))
             FROM invoices WHERE number LIKE $1",
        )
        .bind(&prefix)
        .fetch_one(&mut *tx)
        .await?;
        let number = format_invoice_number(year, last.unwrap_or(0) + 1);

        let query = format!(
            "INSERT INTO invoices
                (organization_id, project_id, number, due_date, notes, tax_rate_bps,
                 subtotal_cents, tax_cents, total_cents)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let invoice = sqlx::query_as::<_, Invoice>(&query)
            .bind(input.organization_id)
            .bind(input.project_id)
            .bind(&number)
            .bind(input.due_date)
            .bind(&input.notes)
            .bind(input.tax_rate_bps)
            .bind(totals.subtotal_cents)
            .bind(totals.tax_cents)
            .bind(totals.total_cents)
            .fetch_one(&mut *tx)
            .await?;

        let line_query = format!(
            "INSERT INTO invoice_line_items
                (invoice_id, description, quantity, unit_price_cents, amount_cents, position)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {LINE_COLUMNS}"
        );
        let mut line_items = Vec::with_capacity(input.line_items.len());
        for (position, (line, amount)) in input.line_items.iter().zip(line_amounts).enumerate() {
            let item = sqlx::query_as::<_, InvoiceLineItem>(&line_query)
                .bind(invoice.id)
                .bind(&line.description)
                .bind(line.quantity)
                .bind(line.unit_price_cents)
                .bind(*amount)
                .bind(position as i32)
                .fetch_one(&mut *tx)
                .await?;
            line_items.push(item);
        }

        tx.commit().await?;
        Ok(InvoiceDetail {
            invoice,
            line_items,
        })
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invoices WHERE id = $1");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Invoice plus line items in display order.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<InvoiceDetail>, sqlx::Error> {
        let Some(invoice) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let query = format!(
            "SELECT {LINE_COLUMNS} FROM invoice_line_items
             WHERE invoice_id = $1 ORDER BY position ASC, id ASC"
        );
        let line_items = sqlx::query_as::<_, InvoiceLineItem>(&query)
            .bind(id)
            .fetch_all(pool)
            .await?;
        Ok(Some(InvoiceDetail {
            invoice,
            line_items,
        }))
    }

    pub async fn list(
        pool: &PgPool,
        organization_id: Option<DbId>,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invoices
             WHERE ($1::BIGINT IS NULL OR organization_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY issued_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(organization_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Move an invoice to `status`, guarded on its current status so a
    /// concurrent transition cannot be overwritten. `paid` stamps `paid_at`.
    ///
    /// Returns `None` if the invoice is missing or no longer in `from_status`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        from_status: &str,
        to_status: &str,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET
                status = $3,
                paid_at = CASE WHEN $3 = 'paid' THEN NOW() ELSE paid_at END
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(from_status)
            .bind(to_status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a draft invoice. Returns `false` if missing or not a draft.
    pub async fn delete_draft(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1 AND status = 'draft'")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
