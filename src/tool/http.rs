//! HTTP-backed capabilities served by an external tool provider.
//!
//! Each capability maps to one GET endpoint on the tool server:
//! `{base_url}/{name}?myParam={input}`. The server replies with JSON;
//! the raw JSON body becomes the observation text.

use async_trait::async_trait;
use tracing::debug;

use super::{Capability, CapabilityHandler, SideEffect};
use crate::error::CapabilityError;

/// A capability backed by a GET endpoint on the external tool server.
pub struct HttpTool {
    client: reqwest::Client,
    base_url: String,
    capability: Capability,
}

impl std::fmt::Debug for HttpTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTool")
            .field("base_url", &self.base_url)
            .field("capability", &self.capability.name)
            .finish()
    }
}

impl HttpTool {
    /// Creates an HTTP capability against the given tool server.
    ///
    /// The capability name doubles as the endpoint path segment.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, capability: Capability) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            capability,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, self.capability.name)
    }
}

#[async_trait]
impl CapabilityHandler for HttpTool {
    fn capability(&self) -> &Capability {
        &self.capability
    }

    async fn invoke(&self, input: &str) -> Result<String, CapabilityError> {
        let name = &self.capability.name;
        let url = self.endpoint();
        debug!(capability = %name, %url, input, "calling tool server");

        let response = self
            .client
            .get(&url)
            .query(&[("myParam", input)])
            .send()
            .await
            .map_err(|e| CapabilityError::Network {
                name: name.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CapabilityError::Status {
                name: name.clone(),
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| CapabilityError::InvalidResponse {
                    name: name.clone(),
                    message: e.to_string(),
                })?;

        Ok(body.to_string())
    }
}

/// Catalog entry for the datetime capability.
pub(crate) fn datetime_capability() -> Capability {
    Capability::new(
        "get_datetime",
        "Use this tool to find the current date and time for any city, \
         or the local system.",
        SideEffect::ExternalCall,
    )
}

/// Catalog entry for the weather capability.
pub(crate) fn weather_capability() -> Capability {
    Capability::new(
        "get_weather",
        "Use this tool to get the current weather for a city.",
        SideEffect::ExternalCall,
    )
}

/// Catalog entry for the calculator capability.
pub(crate) fn calc_capability() -> Capability {
    Capability::new(
        "get_calc",
        "Use this tool to get the result of arithmetic operations. \
         Input should be OPERATION, NUM-ONE, NUM-TWO. Example: ADD, 2, 2.",
        SideEffect::ExternalCall,
    )
}

/// Current date and time for a city or the local system.
#[must_use]
pub fn def_datetime(client: reqwest::Client, base_url: &str) -> HttpTool {
    HttpTool::new(client, base_url, datetime_capability())
}

/// Current weather for a city.
#[must_use]
pub fn def_weather(client: reqwest::Client, base_url: &str) -> HttpTool {
    HttpTool::new(client, base_url, weather_capability())
}

/// Arithmetic over two operands.
#[must_use]
pub fn def_calc(client: reqwest::Client, base_url: &str) -> HttpTool {
    HttpTool::new(client, base_url, calc_capability())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_and_name() {
        let tool = def_weather(reqwest::Client::new(), "http://127.0.0.1:8000/");
        assert_eq!(tool.endpoint(), "http://127.0.0.1:8000/get_weather");
    }

    #[test]
    fn test_default_definitions() {
        let client = reqwest::Client::new();
        let base = "http://127.0.0.1:8000";

        let datetime = def_datetime(client.clone(), base);
        assert_eq!(datetime.capability().name, "get_datetime");
        assert_eq!(datetime.capability().side_effect, SideEffect::ExternalCall);

        let calc = def_calc(client.clone(), base);
        assert!(calc.capability().description.contains("ADD, 2, 2"));

        let weather = def_weather(client, base);
        assert!(weather.capability().description.contains("weather"));
    }
}
