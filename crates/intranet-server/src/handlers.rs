use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use intranet_core::{
    Branch, BranchId, FilterGroup, FilterId, NotificationSettings, OnboardingProgress,
    OnboardingStatus, OrganizationContext, RoleId, SavedFilter, SavedFilterDraft, TableId, User,
    UserId, UserUpdate,
};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::server::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchRoleRequest {
    pub role_id: RoleId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRolesRequest {
    pub role_ids: Vec<RoleId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBranchesRequest {
    pub branch_ids: Vec<BranchId>,
}

#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub language: String,
}

type ApiResult<T> = Result<Json<T>, ServiceError>;

// ---- Users ----

pub async fn get_user(State(state): State<AppState>, Path(user_id): Path<UserId>) -> ApiResult<User> {
    let user = state.services.users.get_user(user_id).await?;
    Ok(Json(User::clone(&user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(update): Json<UserUpdate>,
) -> ApiResult<User> {
    Ok(Json(state.services.users.update_user(user_id, &update).await?))
}

pub async fn switch_role(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<SwitchRoleRequest>,
) -> ApiResult<User> {
    Ok(Json(
        state.services.users.switch_role(user_id, body.role_id).await?,
    ))
}

pub async fn set_roles(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<SetRolesRequest>,
) -> ApiResult<User> {
    Ok(Json(
        state.services.users.set_roles(user_id, &body.role_ids).await?,
    ))
}

pub async fn set_branches(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<SetBranchesRequest>,
) -> ApiResult<User> {
    Ok(Json(
        state
            .services
            .users
            .set_branches(user_id, &body.branch_ids)
            .await?,
    ))
}

pub async fn get_language(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Json<LanguageResponse> {
    Json(LanguageResponse {
        language: state.services.users.language(user_id).await,
    })
}

pub async fn get_organization(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<OrganizationContext> {
    let context = state.services.users.organization(user_id).await?;
    Ok(Json(OrganizationContext::clone(&context)))
}

pub async fn get_active_branch(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Option<Branch>> {
    let branch = state.services.users.active_branch(user_id).await?;
    Ok(Json(branch.map(|b| Branch::clone(&b))))
}

// ---- Onboarding ----

pub async fn get_onboarding(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<OnboardingStatus> {
    let status = state.services.onboarding.status(user_id).await?;
    Ok(Json(OnboardingStatus::clone(&status)))
}

pub async fn update_onboarding(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(progress): Json<OnboardingProgress>,
) -> ApiResult<OnboardingStatus> {
    Ok(Json(
        state
            .services
            .onboarding
            .update_progress(user_id, &progress)
            .await?,
    ))
}

pub async fn complete_onboarding(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<OnboardingStatus> {
    Ok(Json(state.services.onboarding.complete(user_id).await?))
}

// ---- Filters ----

pub async fn list_filters(
    State(state): State<AppState>,
    Path((user_id, table_id)): Path<(UserId, TableId)>,
) -> ApiResult<Vec<SavedFilter>> {
    let filters = state.services.filters.list(user_id, &table_id).await?;
    Ok(Json(filters.to_vec()))
}

pub async fn list_filter_groups(
    State(state): State<AppState>,
    Path((user_id, table_id)): Path<(UserId, TableId)>,
) -> ApiResult<Vec<FilterGroup>> {
    let groups = state.services.filters.groups(user_id, &table_id).await?;
    Ok(Json(groups.to_vec()))
}

pub async fn get_filter(
    State(state): State<AppState>,
    Path(filter_id): Path<FilterId>,
) -> ApiResult<SavedFilter> {
    let filter = state.services.filters.get(filter_id).await?;
    Ok(Json(SavedFilter::clone(&filter)))
}

pub async fn save_filter(
    State(state): State<AppState>,
    Json(draft): Json<SavedFilterDraft>,
) -> ApiResult<SavedFilter> {
    Ok(Json(state.services.filters.save(&draft).await?))
}

pub async fn delete_filter(
    State(state): State<AppState>,
    Path(filter_id): Path<FilterId>,
) -> ApiResult<SavedFilter> {
    Ok(Json(state.services.filters.delete(filter_id).await?))
}

// ---- Notification settings ----

pub async fn get_user_settings(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Json<NotificationSettings> {
    Json(state.services.settings.effective(user_id).await)
}

pub async fn update_user_settings(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(settings): Json<NotificationSettings>,
) -> ApiResult<NotificationSettings> {
    Ok(Json(
        state
            .services
            .settings
            .update_user(user_id, &settings)
            .await?,
    ))
}

pub async fn get_system_settings(State(state): State<AppState>) -> Json<NotificationSettings> {
    Json(state.services.settings.system().await)
}

pub async fn update_system_settings(
    State(state): State<AppState>,
    Json(settings): Json<NotificationSettings>,
) -> ApiResult<NotificationSettings> {
    Ok(Json(state.services.settings.update_system(&settings).await?))
}
