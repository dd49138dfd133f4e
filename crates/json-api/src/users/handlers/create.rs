//! Create User Handler

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally_app::domain::users::{data::NewUser, records::UserUuid};

use crate::{
    extensions::*,
    users::{errors::into_status_error, get::UserResponse},
};

/// Create User Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateUserRequest {
    /// Client-chosen id; generated when omitted
    pub uuid: Option<Uuid>,

    /// Display name
    pub name: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        NewUser {
            uuid: request.uuid.map_or_else(UserUuid::new, UserUuid::from_uuid),
            name: request.name,
        }
    }
}

/// Create User Handler
///
/// Creates the user together with an empty point wallet.
#[endpoint(
    tags("users"),
    summary = "Create User",
    responses(
        (status_code = StatusCode::CREATED, description = "User and wallet created"),
        (status_code = StatusCode::CONFLICT, description = "User already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateUserRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.app_state()?;

    let user = state
        .users
        .create_user(json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/users/{}", user.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(user.into()))
}
