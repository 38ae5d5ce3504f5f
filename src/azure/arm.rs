//! Azure Resource Manager REST client.
//!
//! Implements [`ResourceManager`] with plain HTTPS calls. PUT and DELETE requests that
//! the service accepts asynchronously are followed until they reach a terminal state.

use super::auth::{acquire_token, AccessToken};
use super::payload::{
    AsyncOperationStatus, CreatedResource, ErrorBody, LocationBody, ResourceGroupPage,
    SecurityRuleBody, SubnetBody, VirtualNetworkBody,
};
use super::{Reply, ResourceManager, Response};
use crate::config;
use crate::credentials::Credentials;
use crate::error::{AuthError, RemoteError};
use crate::models::{
    ResourceGroup, SecurityGroup, SecurityGroupRef, SecurityRule, Subnet, VirtualNetwork,
};
use async_trait::async_trait;
use colored::Colorize;
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const ASYNC_OPERATION: &str = "azure-asyncoperation";

/// Resource Manager client bound to one subscription and one location.
pub struct ArmClient {
    http: reqwest::Client,
    endpoint: String,
    subscription_id: String,
    location: String,
    token: AccessToken,
    poll_interval: Duration,
}

impl ArmClient {
    pub fn new(
        subscription_id: &str,
        location: &str,
        token: AccessToken,
    ) -> Result<ArmClient, AuthError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(ArmClient {
            http,
            endpoint: config::ARM_ENDPOINT.to_string(),
            subscription_id: subscription_id.to_string(),
            location: location.to_string(),
            token,
            poll_interval: Duration::from_millis(config::POLL_INTERVAL_MSEC),
        })
    }

    /// Authenticate with `credentials` and build a client for their subscription.
    pub async fn connect(credentials: &Credentials, location: &str) -> Result<ArmClient, AuthError> {
        let token = acquire_token(credentials).await?;
        ArmClient::new(&credentials.subscription_id, location, token)
    }

    /// Point the client at another Resource Manager endpoint (sovereign clouds).
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    fn resource_groups_url(&self) -> String {
        format!(
            "{}/subscriptions/{}/resourcegroups?api-version={}",
            self.endpoint,
            self.subscription_id,
            config::RESOURCES_API_VERSION
        )
    }

    fn resource_group_url(&self, name: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourcegroups/{}?api-version={}",
            self.endpoint,
            self.subscription_id,
            name,
            config::RESOURCES_API_VERSION
        )
    }

    /// URL of a `Microsoft.Network` resource inside `group`.
    fn network_url(&self, group: &str, path: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/{}?api-version={}",
            self.endpoint,
            self.subscription_id,
            group,
            path,
            config::NETWORK_API_VERSION
        )
    }

    /// Send one request, racing it against `cancel`. Non-success replies become errors.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, RemoteError> {
        log::debug!("{} {}", method.as_str().on_blue(), url);
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(self.token.secret());
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RemoteError::Cancelled),
            response = request.send() => response?,
        };
        log::debug!("status={} url={}", response.status(), url);

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(api_error(response).await)
        }
    }

    async fn put<B: Serialize>(
        &self,
        url: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Reply<String> {
        let body = serde_json::to_vec(body).map_err(|e| RemoteError::Transport(e.to_string()))?;
        let response = self.send(Method::PUT, url, Some(body), cancel).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = read_text(response, cancel).await?;
        let status = self.await_completion(status, &headers, cancel).await?;
        Ok(Response::new(status, text))
    }

    /// Follow a long-running operation to its terminal state.
    ///
    /// # Returns
    /// * `Ok(StatusCode)` - Final status of the operation
    /// * `Err(RemoteError)` - The operation failed, was cancelled, or could not be polled
    async fn await_completion(
        &self,
        status: StatusCode,
        headers: &HeaderMap,
        cancel: &CancellationToken,
    ) -> Result<StatusCode, RemoteError> {
        if let Some(url) = header_str(headers, ASYNC_OPERATION) {
            let mut wait = retry_after(headers).unwrap_or(self.poll_interval);
            loop {
                self.pause(wait, cancel).await?;
                let response = self.send(Method::GET, &url, None, cancel).await?;
                let poll_status = response.status();
                wait = retry_after(response.headers()).unwrap_or(self.poll_interval);
                let text = read_text(response, cancel).await?;
                let operation: AsyncOperationStatus = decode(poll_status, &text)?;
                log::debug!("async operation status={}", operation.status);
                match operation.status.as_str() {
                    "Succeeded" => return Ok(poll_status),
                    "Failed" | "Canceled" => {
                        let (code, message) = match operation.error {
                            Some(detail) => (detail.code, detail.message),
                            None => (operation.status.clone(), "operation did not succeed".to_string()),
                        };
                        return Err(RemoteError::Api {
                            status: poll_status,
                            code,
                            message,
                        });
                    }
                    _ => continue,
                }
            }
        }

        if status == StatusCode::ACCEPTED {
            if let Some(url) = header_str(headers, LOCATION.as_str()) {
                let mut wait = retry_after(headers).unwrap_or(self.poll_interval);
                loop {
                    self.pause(wait, cancel).await?;
                    let response = self.send(Method::GET, &url, None, cancel).await?;
                    if response.status() != StatusCode::ACCEPTED {
                        return Ok(response.status());
                    }
                    wait = retry_after(response.headers()).unwrap_or(self.poll_interval);
                    log::debug!("operation still running, next poll in {:?}", wait);
                }
            }
        }

        Ok(status)
    }

    async fn pause(&self, wait: Duration, cancel: &CancellationToken) -> Result<(), RemoteError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RemoteError::Cancelled),
            _ = tokio::time::sleep(wait) => Ok(()),
        }
    }
}

#[async_trait]
impl ResourceManager for ArmClient {
    async fn list_resource_groups(&self, cancel: &CancellationToken) -> Reply<Vec<String>> {
        let mut names = Vec::new();
        let mut next = Some(self.resource_groups_url());
        let mut previous: Option<String> = None;
        let mut status = StatusCode::OK;
        let mut page_count = 0;

        while let Some(url) = next.take() {
            if previous.as_deref() == Some(url.as_str()) {
                return Err(RemoteError::Payload {
                    status,
                    message: "nextLink not unique - possible infinite loop".to_string(),
                });
            }
            let response = self.send(Method::GET, &url, None, cancel).await?;
            status = response.status();
            if status != StatusCode::OK {
                // Nothing to decode; the caller decides what a non-OK listing means.
                return Ok(Response::new(status, names));
            }
            let text = read_text(response, cancel).await?;
            let page: ResourceGroupPage = decode(status, &text)?;
            log::info!(
                "got page#{page_count:2} resource_groups=+{count:3} => {total:3}",
                count = page.value.len(),
                total = names.len() + page.value.len(),
            );
            names.extend(page.value.into_iter().map(|g| g.name));
            next = page.next_link.filter(|link| !link.is_empty());
            previous = Some(url);
            page_count += 1;
        }

        Ok(Response::new(status, names))
    }

    async fn create_resource_group(
        &self,
        group: &ResourceGroup,
        cancel: &CancellationToken,
    ) -> Reply {
        let url = self.resource_group_url(&group.name);
        let body = LocationBody {
            location: &group.location,
        };
        let reply = self.put(&url, &body, cancel).await?;
        Ok(Response::empty(reply.status))
    }

    async fn delete_resource_group(&self, name: &str, cancel: &CancellationToken) -> Reply {
        let url = self.resource_group_url(name);
        let response = self.send(Method::DELETE, &url, None, cancel).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let status = self.await_completion(status, &headers, cancel).await?;
        Ok(Response::empty(status))
    }

    async fn create_virtual_network(
        &self,
        group: &ResourceGroup,
        network: &VirtualNetwork,
        cancel: &CancellationToken,
    ) -> Reply {
        let url = self.network_url(
            &group.name,
            &format!("virtualNetworks/{}", network.name),
        );
        let body = VirtualNetworkBody::new(&self.location, network);
        let reply = self.put(&url, &body, cancel).await?;
        Ok(Response::empty(reply.status))
    }

    async fn create_security_group(
        &self,
        group: &ResourceGroup,
        security_group: &SecurityGroup,
        cancel: &CancellationToken,
    ) -> Reply<SecurityGroupRef> {
        let url = self.network_url(
            &group.name,
            &format!("networkSecurityGroups/{}", security_group.name),
        );
        let body = LocationBody {
            location: &self.location,
        };
        let reply = self.put(&url, &body, cancel).await?;
        let created: CreatedResource = decode(reply.status, &reply.body)?;
        log::info!("security group '{}' id={}", created.name, created.id);
        Ok(Response::new(
            reply.status,
            SecurityGroupRef {
                name: created.name,
                id: created.id,
            },
        ))
    }

    async fn create_subnet(
        &self,
        group: &ResourceGroup,
        network: &str,
        subnet: &Subnet,
        security_group: &SecurityGroupRef,
        cancel: &CancellationToken,
    ) -> Reply {
        let url = self.network_url(
            &group.name,
            &format!("virtualNetworks/{}/subnets/{}", network, subnet.name),
        );
        let body = SubnetBody::new(subnet, &security_group.id);
        let reply = self.put(&url, &body, cancel).await?;
        Ok(Response::empty(reply.status))
    }

    async fn create_security_rule(
        &self,
        group: &ResourceGroup,
        security_group: &str,
        rule: &SecurityRule,
        cancel: &CancellationToken,
    ) -> Reply {
        let url = self.network_url(
            &group.name,
            &format!(
                "networkSecurityGroups/{}/securityRules/{}",
                security_group, rule.name
            ),
        );
        let body = SecurityRuleBody::from(rule);
        let reply = self.put(&url, &body, cancel).await?;
        Ok(Response::empty(reply.status))
    }
}

async fn read_text(
    response: reqwest::Response,
    cancel: &CancellationToken,
) -> Result<String, RemoteError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RemoteError::Cancelled),
        text = response.text() => Ok(text?),
    }
}

/// Decode a JSON body, reporting the failing path.
fn decode<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T, RemoteError> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| RemoteError::Payload {
        status,
        message: format!("path={} error={}", e.path(), e),
    })
}

/// Turn a non-success reply into [`RemoteError::Api`], using the ARM error body when present.
async fn api_error(response: reqwest::Response) -> RemoteError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    error_from_body(status, &text)
}

fn error_from_body(status: StatusCode, text: &str) -> RemoteError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => RemoteError::Api {
            status,
            code: body.error.code,
            message: body.error.message,
        },
        Err(_) => RemoteError::Api {
            status,
            code: status.canonical_reason().unwrap_or("HttpError").to_string(),
            message: text.chars().take(500).collect(),
        },
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// `Retry-After` in whole seconds, capped.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    header_str(headers, RETRY_AFTER.as_str())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs.min(config::MAX_RETRY_AFTER_SEC)))
}
