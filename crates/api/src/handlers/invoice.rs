//! Handlers for the `/invoices` resource.
//!
//! Amounts are integer cents computed server-side from the line items.
//! Clients can read their own organization's invoices; every write needs
//! [`Action::ManageInvoices`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::error::CoreError;
use portal_core::invoice::{
    compute_totals, line_amount_cents, validate_status, validate_transition, LineInput,
    STATUS_SENT,
};
use portal_core::pagination::{clamp_limit, clamp_offset};
use portal_core::policy::Action;
use portal_core::types::DbId;
use portal_core::workflow::validate_required;
use portal_db::models::invoice::{
    CreateInvoice, Invoice, InvoiceDetail, InvoiceListParams, UpdateInvoiceStatus,
};
use portal_db::repositories::{InvoiceRepo, ProjectRepo, UserRepo};
use portal_events::{NotificationMessage, Recipient};

use crate::access::{ensure_org_access, org_scope};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::query::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/invoices
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<InvoiceListParams>,
) -> AppResult<Json<DataResponse<Vec<Invoice>>>> {
    let scope = org_scope(&user)?.or(params.organization_id);
    if let Some(status) = params.status.as_deref() {
        validate_status(status)?;
    }
    let data = InvoiceRepo::list(
        &state.pool,
        scope,
        params.status.as_deref(),
        clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/invoices
///
/// Creates a draft with a generated `INV-YYYY-NNNN` number.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<CreateInvoice>,
) -> AppResult<(StatusCode, Json<InvoiceDetail>)> {
    user.authorize(Action::ManageInvoices)?;

    let mut lines = Vec::with_capacity(input.line_items.len());
    let mut line_amounts = Vec::with_capacity(input.line_items.len());
    for line in &input.line_items {
        validate_required("line item description", Some(line.description.as_str()))?;
        line_amounts.push(line_amount_cents(line.quantity, line.unit_price_cents)?);
        lines.push(LineInput {
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
        });
    }
    let totals = compute_totals(&lines, input.tax_rate_bps)?;

    if let Some(project_id) = input.project_id {
        let project = ProjectRepo::find_by_id(&state.pool, project_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            }))?;
        if project.organization_id != input.organization_id {
            return Err(AppError::BadRequest(format!(
                "Project {project_id} does not belong to organization {}",
                input.organization_id
            )));
        }
    }

    let detail = InvoiceRepo::create(&state.pool, &input, &line_amounts, &totals).await?;
    tracing::info!(
        invoice_id = detail.invoice.id,
        number = %detail.invoice.number,
        total_cents = detail.invoice.total_cents,
        "Invoice created",
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/invoices/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<InvoiceDetail>> {
    let detail = InvoiceRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invoice",
            id,
        }))?;
    ensure_org_access(&user, detail.invoice.organization_id)?;
    Ok(Json(detail))
}

/// PATCH /api/v1/invoices/{id}/status
///
/// Sending an invoice notifies the organization's users.
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateInvoiceStatus>,
) -> AppResult<Json<Invoice>> {
    user.authorize(Action::ManageInvoices)?;
    let next = validate_required("status", input.status.as_deref())?;
    validate_status(next)?;

    let current = find_invoice(&state, id).await?;
    validate_transition(&current.status, next)?;

    let invoice = InvoiceRepo::update_status(&state.pool, id, &current.status, next)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Invoice {id} changed status concurrently; reload and retry"
            )))
        })?;

    tracing::info!(invoice_id = id, from = %current.status, to = %invoice.status, "Invoice status changed");

    if invoice.status == STATUS_SENT {
        notify_organization(&state, &invoice).await;
    }
    Ok(Json(invoice))
}

/// DELETE /api/v1/invoices/{id}
///
/// Only drafts can be deleted.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    user.authorize(Action::ManageInvoices)?;
    if InvoiceRepo::delete_draft(&state.pool, id).await? {
        return Ok(StatusCode::NO_CONTENT);
    }
    let invoice = find_invoice(&state, id).await?;
    Err(AppError::Core(CoreError::Conflict(format!(
        "Invoice {} is {} and cannot be deleted",
        invoice.number, invoice.status
    ))))
}

async fn find_invoice(state: &AppState, id: DbId) -> AppResult<Invoice> {
    InvoiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invoice",
            id,
        }))
}

async fn notify_organization(state: &AppState, invoice: &Invoice) {
    let users = match UserRepo::list_by_organization(&state.pool, invoice.organization_id).await {
        Ok(users) => users,
        Err(e) => {
            tracing::warn!(invoice_id = invoice.id, error = %e, "Failed to load invoice recipients");
            return;
        }
    };
    let recipients: Vec<Recipient> = users
        .into_iter()
        .map(|u| Recipient {
            user_id: u.id,
            email: u.email,
        })
        .collect();

    let message = NotificationMessage {
        title: format!("Invoice {} issued", invoice.number),
        body: format!(
            "Invoice {} for {} is ready.",
            invoice.number,
            format_cents(invoice.total_cents)
        ),
        link: Some(format!("/invoices/{}", invoice.id)),
    };
    state.notifier.notify_all(&recipients, &message).await;
}

/// `12345` -> `$123.45`.
fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}
