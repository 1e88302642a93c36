use crate::{AppState, Error};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use semver::Version;
use service::config::X_VERSION;

pub(crate) struct CompareApiVersion(pub Version);

#[async_trait]
impl FromRequestParts<AppState> for CompareApiVersion {
    type Rejection = Error;

    // The x-version header must parse as a semantic version and name the API
    // version this deployment exposes.
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        let header = parts
            .headers
            .get(X_VERSION)
            .and_then(|value| value.to_str().ok())
            .ok_or(Error::InvalidApiVersion)?;
        let version = Version::parse(header).map_err(|_| Error::InvalidApiVersion)?;
        if header != state.config.api_version() {
            return Err(Error::InvalidApiVersion);
        }
        Ok(CompareApiVersion(version))
    }
}
