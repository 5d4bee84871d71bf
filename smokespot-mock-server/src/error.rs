use smokespot_api::Error as ApiError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Something broke inside the mock itself
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    pub fn permission_denied() -> Error {
        Error::Api(ApiError::PermissionDenied)
    }
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let err = match self {
            Error::Anyhow(err) => {
                tracing::error!(?err, "mock server failed");
                #[cfg(not(test))]
                let err = ApiError::Unknown(String::from("Internal server error"));
                #[cfg(test)]
                let err = ApiError::Unknown(format!("Internal server error: {err:#}"));
                err
            }
            Error::Api(err) => {
                tracing::info!("returning error to client: {err}");
                err
            }
        };
        (
            err.status_code(),
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            err.contents(),
        )
            .into_response()
    }
}
