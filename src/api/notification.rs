use crate::{
    auth::auth::AuthUser, error::AppError, model::notification::Notification, store::Store,
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct NotificationListResponse {
    pub data: Vec<Notification>,
    #[schema(example = 2)]
    pub unread: usize,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MarkedRead {
    #[schema(example = 4)]
    pub updated: usize,
}

/// Notifications addressed to the caller, their role or everyone
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Newest first, with the unread count", body = NotificationListResponse),
        (status = 401, description = "Unauthorized", body = MessageResponse)
    ),
    tag = "Notification",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_notifications(
    auth: AuthUser,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let audiences = auth.audiences();
    let data = store.notifications().for_user(&audiences).await?;
    let unread = store.notifications().unread_count(&audiences).await?;

    Ok(HttpResponse::Ok().json(NotificationListResponse { data, unread }))
}

/// Mark one notification as read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{notification_id}/read",
    params(
        ("notification_id" = u64, Path, description = "ID of the notification")
    ),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 404, description = "Notification not found", body = MessageResponse)
    ),
    tag = "Notification",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_read(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let notification = store
        .notifications()
        .mark_read(path.into_inner(), &auth.audiences())
        .await?;

    Ok(HttpResponse::Ok().json(notification))
}

/// Mark every visible notification as read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "Number of notifications updated", body = MarkedRead)
    ),
    tag = "Notification",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_all_read(
    auth: AuthUser,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let updated = store.notifications().mark_all_read(&auth.audiences()).await?;
    Ok(HttpResponse::Ok().json(MarkedRead { updated }))
}
