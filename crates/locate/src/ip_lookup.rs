use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};
use vigil_core::Location;

use crate::config::{LookupFormat, LookupService};
use crate::error::LookupError;

/// Placeholder used when a service omits a descriptive field.
const NOT_REPORTED: &str = "unknown";

/// Coarse geolocation from an external "what is my IP" service.
///
/// Only the public IP is mandatory. A response without one, a non-2xx
/// status, or an explicit `"status": "fail"` body counts as a failure.
#[derive(Debug, Clone)]
pub struct IpLookup {
    service: LookupService,
    client: Client,
}

impl IpLookup {
    /// Create a lookup sharing an existing HTTP client.
    pub fn with_client(service: LookupService, client: Client) -> Self {
        Self { service, client }
    }

    pub fn name(&self) -> &str {
        &self.service.name
    }

    #[instrument(skip(self), fields(service = %self.service.name))]
    pub async fn lookup(&self) -> Result<Location, LookupError> {
        let response = self.client.get(&self.service.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: Value = serde_json::from_slice(&response.bytes().await?)?;
        let location = self.service.format.extract(&body)?;
        debug!(method = location.method(), "lookup succeeded");
        Ok(location)
    }
}

impl LookupFormat {
    /// Map a service response body onto an [`Location::IpLocale`].
    pub fn extract(self, body: &Value) -> Result<Location, LookupError> {
        let (ip_key, country_key, isp_key) = match self {
            Self::IpapiCo => {
                if body.get("error").and_then(Value::as_bool) == Some(true) {
                    return Err(LookupError::Service(reason(body, "reason")));
                }
                ("ip", "country_name", "org")
            }
            Self::IpApiCom => {
                if text(body, "status") == Some("fail") {
                    return Err(LookupError::Service(reason(body, "message")));
                }
                ("query", "country", "isp")
            }
        };

        let ip = text(body, ip_key).ok_or(LookupError::MissingField(ip_key))?;
        let place = [text(body, "city"), text(body, country_key)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");

        Ok(Location::IpLocale {
            ip: ip.to_owned(),
            place: if place.is_empty() {
                NOT_REPORTED.to_owned()
            } else {
                place
            },
            isp: text(body, isp_key).unwrap_or(NOT_REPORTED).to_owned(),
        })
    }
}

/// A non-empty string field.
fn text<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn reason(body: &Value, key: &str) -> String {
    text(body, key).unwrap_or("unspecified").to_owned()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn ipapi_co_response() {
        let body = json!({
            "ip": "203.0.113.7",
            "city": "Oslo",
            "country_name": "Norway",
            "org": "Example ISP"
        });
        assert_eq!(
            LookupFormat::IpapiCo.extract(&body).unwrap(),
            Location::IpLocale {
                ip: "203.0.113.7".into(),
                place: "Oslo, Norway".into(),
                isp: "Example ISP".into(),
            }
        );
    }

    #[test]
    fn ip_api_com_response() {
        let body = json!({
            "status": "success",
            "query": "198.51.100.4",
            "country": "Chile",
            "isp": "Carrier"
        });
        assert_eq!(
            LookupFormat::IpApiCom.extract(&body).unwrap(),
            Location::IpLocale {
                ip: "198.51.100.4".into(),
                place: "Chile".into(),
                isp: "Carrier".into(),
            }
        );
    }

    #[test]
    fn missing_ip_is_a_failure() {
        let body = json!({ "city": "Oslo", "org": "x" });
        assert!(matches!(
            LookupFormat::IpapiCo.extract(&body),
            Err(LookupError::MissingField("ip"))
        ));
        assert!(matches!(
            LookupFormat::IpApiCom.extract(&json!({ "query": "  " })),
            Err(LookupError::MissingField("query"))
        ));
    }

    #[test]
    fn explicit_failure_bodies_are_rejected() {
        let fail = json!({ "status": "fail", "message": "reserved range", "query": "10.0.0.1" });
        assert!(matches!(
            LookupFormat::IpApiCom.extract(&fail),
            Err(LookupError::Service(m)) if m == "reserved range"
        ));

        let limited = json!({ "error": true, "reason": "RateLimited", "ip": "203.0.113.7" });
        assert!(matches!(
            LookupFormat::IpapiCo.extract(&limited),
            Err(LookupError::Service(m)) if m == "RateLimited"
        ));
    }

    #[test]
    fn absent_descriptive_fields_fall_back_to_unknown() {
        let body = json!({ "ip": "203.0.113.7" });
        assert_eq!(
            LookupFormat::IpapiCo.extract(&body).unwrap(),
            Location::IpLocale {
                ip: "203.0.113.7".into(),
                place: "unknown".into(),
                isp: "unknown".into(),
            }
        );
    }

    /// Serve one canned HTTP response on a local port.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}/json")
    }

    fn lookup(url: String, format: LookupFormat) -> IpLookup {
        IpLookup::with_client(
            LookupService {
                name: "test".into(),
                url,
                format,
            },
            Client::new(),
        )
    }

    #[tokio::test]
    async fn lookup_parses_a_live_response() {
        let url = serve_once("200 OK", r#"{"query":"192.0.2.1","city":"Lima","country":"Peru","isp":"Net"}"#).await;
        let location = lookup(url, LookupFormat::IpApiCom).lookup().await.unwrap();
        assert_eq!(
            location,
            Location::IpLocale {
                ip: "192.0.2.1".into(),
                place: "Lima, Peru".into(),
                isp: "Net".into(),
            }
        );
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        let url = serve_once("503 Service Unavailable", "{}").await;
        let err = lookup(url, LookupFormat::IpapiCo).lookup().await.unwrap_err();
        assert!(matches!(err, LookupError::Status(503)));
    }
}
