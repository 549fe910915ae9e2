//! Handlers for maintenance plans and their hour ledger.
//!
//! Clients may read the plan and ledger of their own projects. Every write
//! needs [`Action::ManageMaintenancePlans`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::error::CoreError;
use portal_core::pagination::{clamp_limit, clamp_offset};
use portal_core::policy::Action;
use portal_core::types::DbId;
use portal_core::workflow::{validate_hours, validate_required};
use portal_db::models::maintenance_plan::{
    CreateMaintenancePlan, HourDeduction, HourTransaction, HoursInput, MaintenancePlan,
    MaintenancePlanSummary, UpdateMaintenancePlan,
};
use portal_db::repositories::{HourTransactionRepo, MaintenancePlanRepo};

use crate::access::load_project_for;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::query::{PaginationParams, DEFAULT_LIMIT, MAX_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_PLAN_NAME: &str = "Maintenance plan";

/// POST /api/v1/projects/{project_id}/maintenance-plans
///
/// 409 when the project already has an active plan.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    AppJson(input): AppJson<CreateMaintenancePlan>,
) -> AppResult<(StatusCode, Json<MaintenancePlanSummary>)> {
    user.authorize(Action::ManageMaintenancePlans)?;
    load_project_for(&state.pool, &user, project_id).await?;

    validate_hours("monthly_hours", input.monthly_hours)?;
    if let Some(hours) = input.purchased_hours {
        validate_hours("purchased_hours", hours)?;
    }
    let name = match input.name.as_deref() {
        Some(_) => validate_required("name", input.name.as_deref())?,
        None => DEFAULT_PLAN_NAME,
    };

    if MaintenancePlanRepo::find_active_for_project(&state.pool, project_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Project {project_id} already has an active maintenance plan"
        ))));
    }

    let plan = MaintenancePlanRepo::create(&state.pool, project_id, name, &input).await?;
    tracing::info!(plan_id = plan.id, project_id, "Maintenance plan created");
    Ok((StatusCode::CREATED, Json(plan.into())))
}

/// GET /api/v1/projects/{project_id}/maintenance-plan
///
/// The project's active plan.
pub async fn get_active(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<MaintenancePlanSummary>> {
    load_project_for(&state.pool, &user, project_id).await?;
    let plan = MaintenancePlanRepo::find_active_for_project(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Active maintenance plan for project",
            id: project_id,
        }))?;
    Ok(Json(plan.into()))
}

/// GET /api/v1/maintenance-plans/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MaintenancePlanSummary>> {
    let plan = load_plan_for(&state, &user, id).await?;
    Ok(Json(plan.into()))
}

/// PATCH /api/v1/maintenance-plans/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateMaintenancePlan>,
) -> AppResult<Json<MaintenancePlanSummary>> {
    user.authorize(Action::ManageMaintenancePlans)?;
    if let Some(hours) = input.monthly_hours {
        validate_hours("monthly_hours", hours)?;
    }
    if input.name.is_some() {
        validate_required("name", input.name.as_deref())?;
    }

    let plan = MaintenancePlanRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MaintenancePlan",
            id,
        }))?;
    Ok(Json(plan.into()))
}

/// POST /api/v1/maintenance-plans/{id}/purchase
pub async fn purchase(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<HoursInput>,
) -> AppResult<Json<MaintenancePlanSummary>> {
    user.authorize(Action::ManageMaintenancePlans)?;
    let description = input
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Purchased {} hours", input.hours));

    let plan = MaintenancePlanRepo::purchase_hours(
        &state.pool,
        id,
        input.hours,
        &description,
        Some(user.user_id),
    )
    .await?;
    tracing::info!(plan_id = id, hours = input.hours, "Hours purchased");
    Ok(Json(plan.into()))
}

/// POST /api/v1/maintenance-plans/{id}/reset-cycle
pub async fn reset_cycle(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MaintenancePlanSummary>> {
    user.authorize(Action::ManageMaintenancePlans)?;
    let plan = MaintenancePlanRepo::reset_cycle(&state.pool, id, Some(user.user_id)).await?;
    tracing::info!(plan_id = id, "Billing cycle reset");
    Ok(Json(plan.into()))
}

/// POST /api/v1/maintenance-plans/{id}/deduct
///
/// Manual deduction, e.g. for work not tracked as a task or change request.
pub async fn deduct(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<HoursInput>,
) -> AppResult<Json<HourDeduction>> {
    user.authorize(Action::ManageMaintenancePlans)?;
    let description = validate_required("description", input.description.as_deref())?;

    let deduction = MaintenancePlanRepo::deduct_hours(
        &state.pool,
        id,
        input.hours,
        description,
        Some(user.user_id),
    )
    .await?;
    tracing::info!(
        plan_id = id,
        hours = deduction.deducted,
        source = deduction.source.as_str(),
        is_overage = deduction.is_overage,
        "Manual hour deduction",
    );
    Ok(Json(deduction))
}

/// GET /api/v1/maintenance-plans/{id}/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<HourTransaction>>>> {
    load_plan_for(&state, &user, id).await?;
    let data = HourTransactionRepo::list_for_plan(
        &state.pool,
        id,
        clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data }))
}

/// Load a plan and check that `user` may see its project.
async fn load_plan_for(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<MaintenancePlan> {
    let plan = MaintenancePlanRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MaintenancePlan",
            id,
        }))?;
    load_project_for(&state.pool, user, plan.project_id).await?;
    Ok(plan)
}
