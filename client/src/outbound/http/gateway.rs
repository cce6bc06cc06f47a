//! Reqwest-backed gateway adapter for the blood-bank backend.
//!
//! This adapter owns transport details only: URL building, bearer auth,
//! timeout and status mapping, and JSON decoding into domain records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::dto::{
    BloodRequestDto, CreateRequestDto, DashboardStatsDto, DonationRecordDto, DonorListItemDto,
    DonorProfileDto, DonorProfileRequestDto, ErrorBodyDto, HistoryCreateDto, HistoryResponseDto,
    LoginRequestDto, ProfileUpdateDto, SignupRequestDto, TokenDto, UserDto,
};
use crate::domain::ports::{BloodBankGateway, GatewayError};
use crate::domain::{
    AccessToken, BloodRequest, DashboardStats, DonationRecord, Donor, DonorProfile,
    GENERIC_API_MESSAGE, History, HistoryFilter, LoginCredentials, NewBloodRequest, NewDonation,
    NewDonorProfile, ProfileUpdate, Registration, RequestId, User,
};

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("bloodbank-client/", env!("CARGO_PKG_VERSION"));

/// Gateway adapter that talks JSON over HTTP to one backend base URL.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    /// Build an adapter with an explicit request timeout and user agent.
    ///
    /// A base URL without a trailing slash is treated as a directory, so
    /// `http://host/api` resolves `auth/login` to `http://host/api/auth/login`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: directory_url(base_url),
        })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, GatewayError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| GatewayError::transport(format!("invalid endpoint {path}: {err}")))?;
        debug!(%method, %url, "calling backend");
        Ok(self.client.request(method, url))
    }

    fn authed(
        &self,
        method: Method,
        path: &str,
        token: &AccessToken,
    ) -> Result<RequestBuilder, GatewayError> {
        Ok(self.request(method, path)?.bearer_auth(token.expose()))
    }
}

fn directory_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, GatewayError> {
    let response = builder.send().await.map_err(map_transport_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    serde_json::from_slice(body.as_ref()).map_err(|err| {
        GatewayError::decode(format!("invalid backend JSON payload: {err}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::transport(format!("request timed out: {error}"))
    } else {
        GatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GatewayError {
    let message = serde_json::from_slice::<ErrorBodyDto>(body)
        .ok()
        .and_then(|dto| dto.message())
        .unwrap_or_else(|| GENERIC_API_MESSAGE.to_owned());
    warn!(status = status.as_u16(), %message, "backend rejected request");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::unauthenticated(message),
        _ => GatewayError::rejected(status.as_u16(), message),
    }
}

fn decode_all<D>(
    items: Vec<D>,
    convert: impl Fn(D) -> Result<Donor, String>,
) -> Result<Vec<Donor>, GatewayError> {
    items
        .into_iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()
        .map_err(GatewayError::decode)
}

#[async_trait]
impl BloodBankGateway for HttpGateway {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken, GatewayError> {
        let body = LoginRequestDto {
            email: credentials.email().as_ref(),
            password: credentials.password(),
        };
        let dto: TokenDto = send(self.request(Method::POST, "auth/login")?.json(&body)).await?;
        AccessToken::new(dto.access_token)
            .map_err(|err| GatewayError::decode(format!("login response: {err}")))
    }

    async fn register(&self, registration: &Registration) -> Result<User, GatewayError> {
        let body = SignupRequestDto::from(registration);
        let dto: UserDto = send(self.request(Method::POST, "auth/signup")?.json(&body)).await?;
        dto.into_domain().map_err(GatewayError::decode)
    }

    async fn profile(&self, token: &AccessToken) -> Result<User, GatewayError> {
        let dto: UserDto = send(self.authed(Method::GET, "auth/profile", token)?).await?;
        dto.into_domain().map_err(GatewayError::decode)
    }

    async fn update_profile(
        &self,
        token: &AccessToken,
        update: &ProfileUpdate,
    ) -> Result<User, GatewayError> {
        let body = ProfileUpdateDto::from(update);
        let dto: UserDto =
            send(self.authed(Method::PUT, "auth/profile/update", token)?.json(&body)).await?;
        dto.into_domain().map_err(GatewayError::decode)
    }

    async fn list_donors(&self, token: &AccessToken) -> Result<Vec<Donor>, GatewayError> {
        let dtos: Vec<DonorListItemDto> = send(self.authed(Method::GET, "donor/all", token)?).await?;
        decode_all(dtos, DonorListItemDto::into_domain)
    }

    async fn upsert_donor_profile(
        &self,
        token: &AccessToken,
        profile: &NewDonorProfile,
    ) -> Result<DonorProfile, GatewayError> {
        let body = DonorProfileRequestDto::from(profile);
        let dto: DonorProfileDto =
            send(self.authed(Method::POST, "donor/", token)?.json(&body)).await?;
        dto.into_domain().map_err(GatewayError::decode)
    }

    async fn create_request(
        &self,
        token: &AccessToken,
        request: &NewBloodRequest,
    ) -> Result<BloodRequest, GatewayError> {
        let body = CreateRequestDto::from(request);
        let dto: BloodRequestDto =
            send(self.authed(Method::POST, "recipient/", token)?.json(&body)).await?;
        dto.into_domain().map_err(GatewayError::decode)
    }

    async fn list_requests(&self, token: &AccessToken) -> Result<Vec<BloodRequest>, GatewayError> {
        let dtos: Vec<BloodRequestDto> = send(self.authed(Method::GET, "recipient/", token)?).await?;
        dtos.into_iter()
            .map(BloodRequestDto::into_domain)
            .collect::<Result<Vec<_>, _>>()
            .map_err(GatewayError::decode)
    }

    async fn request_matches(
        &self,
        token: &AccessToken,
        request_id: RequestId,
    ) -> Result<Vec<Donor>, GatewayError> {
        let path = format!("recipient/matches/{request_id}");
        let dtos: Vec<DonorListItemDto> = send(self.authed(Method::GET, &path, token)?).await?;
        decode_all(dtos, DonorListItemDto::into_domain)
    }

    async fn history(
        &self,
        token: &AccessToken,
        filter: &HistoryFilter,
    ) -> Result<History, GatewayError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(entry_type) = filter.entry_type() {
            query.push(("entry_type", entry_type.as_str().to_owned()));
        }
        if let Some(start) = filter.start_date() {
            query.push(("start_date", start.to_string()));
        }
        if let Some(end) = filter.end_date() {
            query.push(("end_date", end.to_string()));
        }
        let dto: HistoryResponseDto =
            send(self.authed(Method::GET, "auth/history", token)?.query(&query)).await?;
        dto.into_domain().map_err(GatewayError::decode)
    }

    async fn log_donation(
        &self,
        token: &AccessToken,
        donation: &NewDonation,
    ) -> Result<DonationRecord, GatewayError> {
        let body = HistoryCreateDto::from(donation);
        let dto: DonationRecordDto =
            send(self.authed(Method::POST, "history/", token)?.json(&body)).await?;
        dto.into_domain().map_err(GatewayError::decode)
    }

    async fn dashboard_stats(&self, token: &AccessToken) -> Result<DashboardStats, GatewayError> {
        let dto: DashboardStatsDto =
            send(self.authed(Method::GET, "stats/dashboard", token)?).await?;
        dto.into_domain().map_err(GatewayError::decode)
    }
}
