use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::instrument;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::entity::app_version;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::app_version::{
    AppVersionCriteria, AppVersionPayload, AppVersionResponse, ListParams,
};
use crate::query;
use crate::state::AppState;

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_app_versions, create_app_version))
        .routes(routes!(count_app_versions))
        .routes(routes!(
            get_app_version,
            update_app_version,
            partial_update_app_version,
            delete_app_version
        ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "App Versions",
    operation_id = "createAppVersion",
    summary = "Create a new app version",
    description = "Persists a new app version. The id is assigned by the server; a payload that already carries one is rejected.",
    request_body = AppVersionPayload,
    responses(
        (status = 201, description = "App version created", body = AppVersionResponse,
         headers(("Location" = String, description = "URL of the created record"))),
        (status = 400, description = "Id preset on the payload (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_app_version(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AppVersionPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.id.is_some() {
        return Err(AppError::Validation(
            "A new app version cannot already have an id".into(),
        ));
    }

    let mut record = payload;
    state.auditor.stamp_create(&mut record);

    let id = Uuid::new_v4();
    let model = to_active_model(id, record).insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/app-versions/{id}"))],
        Json(AppVersionResponse::from(model)),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "App Versions",
    operation_id = "updateAppVersion",
    summary = "Replace an existing app version",
    description = "Full overwrite: every stored field takes the payload's value, including absent ones, which become null. The payload id must be present and match the path.",
    params(("id" = Uuid, Path, description = "App version id")),
    request_body = AppVersionPayload,
    responses(
        (status = 200, description = "App version updated", body = AppVersionResponse),
        (status = 400, description = "Missing, mismatched or unknown id (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id = %id))]
pub async fn update_app_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<AppVersionPayload>,
) -> Result<Json<AppVersionResponse>, AppError> {
    check_body_id(&payload, id)?;

    let txn = state.db.begin().await?;

    // Replace requires an existing row; an unknown id is reported as a
    // bad request, not 404. See DESIGN.md.
    if app_version::Entity::find_by_id(id).one(&txn).await?.is_none() {
        return Err(AppError::Validation("Entity not found".into()));
    }

    let mut record = payload;
    state.auditor.stamp_update(&mut record);

    let model = to_active_model(id, record).update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "App Versions",
    operation_id = "partialUpdateAppVersion",
    summary = "Partially update an app version",
    description = "Merge write: only fields present in the payload overwrite the stored values; absent fields are left untouched. The payload id must be present and match the path.",
    params(("id" = Uuid, Path, description = "App version id")),
    request_body = AppVersionPayload,
    responses(
        (status = 200, description = "Merged app version", body = AppVersionResponse),
        (status = 400, description = "Missing or mismatched id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "App version not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id = %id))]
pub async fn partial_update_app_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<AppVersionPayload>,
) -> Result<Json<AppVersionResponse>, AppError> {
    check_body_id(&payload, id)?;

    let mut record = payload;
    state.auditor.stamp_update(&mut record);

    if record.is_noop_update() {
        let existing = find_app_version(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_app_version(&txn, id).await?;
    let mut active: app_version::ActiveModel = existing.into();

    if let Some(major) = record.major {
        active.major = Set(Some(major));
    }
    if let Some(minor) = record.minor {
        active.minor = Set(Some(minor));
    }
    if let Some(patch) = record.patch {
        active.patch = Set(Some(patch));
    }
    if let Some(release_date) = record.release_date {
        active.release_date = Set(Some(release_date));
    }
    if let Some(description) = record.description {
        active.description = Set(Some(description));
    }
    if let Some(location) = record.location {
        active.location = Set(Some(location));
    }
    if let Some(ty) = record.r#type {
        active.r#type = Set(Some(ty));
    }
    if let Some(created_by) = record.created_by {
        active.created_by = Set(Some(created_by));
    }
    if let Some(created_date) = record.created_date {
        active.created_date = Set(Some(created_date));
    }
    if let Some(last_modified_by) = record.last_modified_by {
        active.last_modified_by = Set(Some(last_modified_by));
    }
    if let Some(last_modified_date) = record.last_modified_date {
        active.last_modified_date = Set(Some(last_modified_date));
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "App Versions",
    operation_id = "listAppVersions",
    summary = "List app versions by criteria",
    description = "Returns the app versions matching the `<field>.<operator>=<value>` query filters, AND-combined; no filters means every record. Supports `distinct`, optional pagination and sorting.",
    params(
        ListParams,
        ("distinct" = Option<bool>, Query, description = "Deduplicate matched records before returning"),
    ),
    responses(
        (status = 200, description = "Matching app versions", body = Vec<AppVersionResponse>),
        (status = 400, description = "Malformed filter (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, params, raw_query))]
pub async fn list_app_versions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    Query(raw_query): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<AppVersionResponse>>, AppError> {
    let criteria = parse_criteria(&raw_query)?;
    let mut select = query::select(&criteria);

    let order = query::sort_order(params.sort_order.as_deref()).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown sort order '{}'",
            params.sort_order.as_deref().unwrap_or_default()
        ))
    })?;
    if let Some(sort_by) = params.sort_by.as_deref() {
        let column = query::sort_column(sort_by).ok_or_else(|| {
            AppError::Validation(format!("Unknown sort field '{sort_by}'"))
        })?;
        select = select.order_by(column, order);
    }

    if params.page.is_some() || params.per_page.is_some() {
        let page = Ord::max(params.page.unwrap_or(1), 1);
        let per_page = params.per_page.unwrap_or(20).clamp(1, 100);
        // A page number beyond what a u64 offset can address is an empty
        // page, not a panic.
        let Some(offset) = (page - 1).checked_mul(per_page) else {
            return Ok(Json(Vec::new()));
        };
        select = select.offset(Some(offset)).limit(Some(per_page));
    }

    let rows = select.all(&state.db).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/count",
    tag = "App Versions",
    operation_id = "countAppVersions",
    summary = "Count app versions by criteria",
    description = "Returns the number of app versions matching the same filters the list endpoint accepts.",
    params(
        ("distinct" = Option<bool>, Query, description = "Deduplicate matched records before counting"),
    ),
    responses(
        (status = 200, description = "Matching record count", body = u64),
        (status = 400, description = "Malformed filter (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, raw_query))]
pub async fn count_app_versions(
    State(state): State<AppState>,
    Query(raw_query): Query<Vec<(String, String)>>,
) -> Result<Json<u64>, AppError> {
    let criteria = parse_criteria(&raw_query)?;
    let total = query::select(&criteria).count(&state.db).await?;
    Ok(Json(total))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "App Versions",
    operation_id = "getAppVersion",
    summary = "Get an app version by id",
    params(("id" = Uuid, Path, description = "App version id")),
    responses(
        (status = 200, description = "App version details", body = AppVersionResponse),
        (status = 404, description = "App version not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_app_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppVersionResponse>, AppError> {
    let model = find_app_version(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "App Versions",
    operation_id = "deleteAppVersion",
    summary = "Delete an app version by id",
    description = "Removes the record if present. Deleting an unknown id is a no-op and still returns 204.",
    params(("id" = Uuid, Path, description = "App version id")),
    responses(
        (status = 204, description = "App version deleted (or did not exist)"),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn delete_app_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_version::Entity::delete_by_id(id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_criteria(raw_query: &[(String, String)]) -> Result<AppVersionCriteria, AppError> {
    AppVersionCriteria::from_query_pairs(raw_query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

fn check_body_id(payload: &AppVersionPayload, path_id: Uuid) -> Result<(), AppError> {
    let body_id = payload
        .id
        .ok_or_else(|| AppError::Validation("Invalid id: payload has no id".into()))?;
    if body_id != path_id {
        return Err(AppError::Validation(
            "Invalid id: payload id does not match the path".into(),
        ));
    }
    Ok(())
}

async fn find_app_version<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<app_version::Model, AppError> {
    app_version::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("App version not found".into()))
}

/// Full-overwrite active model: every column takes the payload's value,
/// including absent ones.
fn to_active_model(id: Uuid, p: AppVersionPayload) -> app_version::ActiveModel {
    app_version::ActiveModel {
        id: Set(id),
        major: Set(p.major),
        minor: Set(p.minor),
        patch: Set(p.patch),
        release_date: Set(p.release_date),
        description: Set(p.description),
        location: Set(p.location),
        r#type: Set(p.r#type),
        created_by: Set(p.created_by),
        created_date: Set(p.created_date),
        last_modified_by: Set(p.last_modified_by),
        last_modified_date: Set(p.last_modified_date),
    }
}
