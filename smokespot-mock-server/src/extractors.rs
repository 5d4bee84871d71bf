use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{self, request},
};
use smokespot_api::AuthToken;

use crate::error::Error;

/// Bearer token of the caller, if any. A malformed header is refused
/// outright rather than treated as anonymous.
pub struct Bearer(pub Option<AuthToken>);

impl Bearer {
    pub fn token(&self) -> Option<&AuthToken> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S: Sync> FromRequestParts<S> for Bearer {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, _state: &S) -> Result<Bearer, Error> {
        match req.headers.get(http::header::AUTHORIZATION) {
            None => Ok(Bearer(None)),
            Some(auth) => {
                let auth = auth.to_str().map_err(|_| Error::permission_denied())?;
                let mut auth = auth.split(' ');
                if !auth
                    .next()
                    .ok_or(Error::permission_denied())?
                    .eq_ignore_ascii_case("bearer")
                {
                    return Err(Error::permission_denied());
                }
                let token = auth.next().ok_or(Error::permission_denied())?;
                if auth.next().is_some() {
                    return Err(Error::permission_denied());
                }
                Ok(Bearer(Some(AuthToken(String::from(token)))))
            }
        }
    }
}
