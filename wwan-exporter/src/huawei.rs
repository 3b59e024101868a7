// WWAN Exporter - Huawei router client
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! [`DeviceClient`] for the Huawei LTE/5G router web API.
//!
//! A refresh opens a session (`SesTokInfo`), logs in, reads the four record
//! groups and logs out again. The session is not kept between refreshes, so
//! a router reboot or an expired session costs at most one failed scrape.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{COOKIE, SET_COOKIE};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use wwan::{DeviceClient, DeviceError, DeviceSnapshot, Record, Settings};

use crate::xml::{self, ERROR_ALREADY_LOGGED_IN};

/// CSRF header sent with every request
const TOKEN_HEADER: &str = "__RequestVerificationToken";
/// Header carrying the post-login token
const TOKEN_HEADER_ONE: &str = "__RequestVerificationTokenone";

/// SHA-256 based login, supported by all current firmwares
const PASSWORD_TYPE: &str = "4";

const SESSION_PATH: &str = "api/webserver/SesTokInfo";
const LOGIN_PATH: &str = "api/user/login";
const LOGOUT_PATH: &str = "api/user/logout";
const SIGNAL_PATH: &str = "api/device/signal";
const TRAFFIC_PATH: &str = "api/monitoring/traffic-statistics";
const NOTIFICATIONS_PATH: &str = "api/monitoring/check-notifications";
const INFORMATION_PATH: &str = "api/device/information";

/// Encode a password for `password_type` 4:
/// `b64(sha256_hex(username + b64(sha256_hex(password)) + token))`.
pub fn encode_password(username: &str, password: &str, token: &str) -> String {
    let hashed = STANDARD.encode(hex::encode(Sha256::digest(password.as_bytes())));
    let salted = format!("{}{}{}", username, hashed, token);
    STANDARD.encode(hex::encode(Sha256::digest(salted.as_bytes())))
}

/// Session cookie (`SessionID=...`) from a `Set-Cookie` value
fn session_cookie(set_cookie: &str) -> Option<String> {
    set_cookie
        .split(';')
        .map(str::trim)
        .find(|part| part.starts_with("SessionID="))
        .map(str::to_string)
}

/// Blocking client for one router
pub struct HuaweiClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    timeout: Duration,
    cookie: Option<String>,
    token: Option<String>,
}

impl HuaweiClient {
    /// Create a client from the exporter settings.
    ///
    /// Must be called outside of an async context.
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(settings.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: settings.router_url(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            timeout: settings.request_timeout,
            cookie: None,
            token: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_session(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }
        request
    }

    fn transport_error(&self, e: reqwest::Error) -> DeviceError {
        if e.is_timeout() {
            DeviceError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            DeviceError::Connection(e.to_string())
        }
    }

    fn send(&mut self, request: RequestBuilder) -> Result<Record, DeviceError> {
        let response = self
            .with_session(request)
            .send()
            .map_err(|e| self.transport_error(e))?;
        self.absorb_headers(&response);

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Protocol(format!("HTTP status {}", status)));
        }
        let body = response.text().map_err(|e| self.transport_error(e))?;
        xml::parse_response(&body)
    }

    /// Pick up a rotated token or session cookie
    fn absorb_headers(&mut self, response: &Response) {
        let headers = response.headers();
        let token = headers
            .get(TOKEN_HEADER_ONE)
            .or_else(|| headers.get(TOKEN_HEADER))
            .and_then(|v| v.to_str().ok());
        if let Some(token) = token {
            // Some firmwares return several '#'-separated tokens
            let first = token.split('#').next().unwrap_or(token);
            self.token = Some(first.to_string());
        }
        if let Some(cookie) = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(session_cookie)
        {
            self.cookie = Some(cookie);
        }
    }

    fn get(&mut self, path: &str) -> Result<Record, DeviceError> {
        let request = self.http.get(self.url(path));
        self.send(request)
    }

    fn post(&mut self, path: &str, body: String) -> Result<Record, DeviceError> {
        let request = self
            .http
            .post(self.url(path))
            .header("Content-Type", "application/x-www-form-urlencoded; charset=UTF-8")
            .body(body);
        self.send(request)
    }

    fn open_session(&mut self) -> Result<(), DeviceError> {
        self.cookie = None;
        self.token = None;

        let session = self.get(SESSION_PATH)?;
        let cookie = session.text("SesInfo");
        let token = session.text("TokInfo");
        if token.is_empty() {
            return Err(DeviceError::Protocol("SesTokInfo without TokInfo".to_string()));
        }
        if !cookie.is_empty() {
            self.cookie = Some(cookie);
        }
        self.token = Some(token);
        Ok(())
    }

    fn login(&mut self) -> Result<(), DeviceError> {
        self.open_session()?;

        let token = self.token.clone().unwrap_or_default();
        let password = encode_password(&self.username, &self.password, &token);
        let body = xml::request(&[
            ("Username", self.username.as_str()),
            ("Password", password.as_str()),
            ("password_type", PASSWORD_TYPE),
        ]);

        match self.post(LOGIN_PATH, body) {
            Ok(_) => {
                debug!(user = %self.username, "Logged in");
                Ok(())
            }
            Err(DeviceError::Response { code, .. }) if code == ERROR_ALREADY_LOGGED_IN => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn read_groups(&mut self) -> Result<DeviceSnapshot, DeviceError> {
        Ok(DeviceSnapshot {
            signal: self.signal()?,
            traffic_statistics: self.traffic_statistics()?,
            notifications: self.notifications()?,
            device_information: self.device_information()?,
        })
    }

    fn logout(&mut self) {
        let body = xml::request(&[("Logout", "1")]);
        if let Err(e) = self.post(LOGOUT_PATH, body) {
            debug!(error = %e, "Logout failed");
        }
        self.cookie = None;
        self.token = None;
    }
}

impl DeviceClient for HuaweiClient {
    fn signal(&mut self) -> Result<Record, DeviceError> {
        self.get(SIGNAL_PATH)
    }

    fn traffic_statistics(&mut self) -> Result<Record, DeviceError> {
        self.get(TRAFFIC_PATH)
    }

    fn notifications(&mut self) -> Result<Record, DeviceError> {
        self.get(NOTIFICATIONS_PATH)
    }

    fn device_information(&mut self) -> Result<Record, DeviceError> {
        self.get(INFORMATION_PATH)
    }

    fn fetch_snapshot(&mut self) -> Result<DeviceSnapshot, DeviceError> {
        if let Err(e) = self.login() {
            self.cookie = None;
            self.token = None;
            return Err(e);
        }

        let snapshot = self.read_groups();
        self.logout();
        if snapshot.is_ok() {
            debug!(url = %self.base_url, "Fetched router state");
        }
        snapshot
    }
}

/// Log where the client points, without credentials
pub fn describe(settings: &Settings) {
    info!(
        router = %settings.router_url(),
        user = %settings.username,
        timeout_ms = settings.request_timeout.as_millis() as u64,
        "Router client configured"
    );
}
