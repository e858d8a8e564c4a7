use reqwest::{header::CONTENT_TYPE, Url};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    constants::{DEFAULT_ORDER_ENDPOINT, JSON_CONTENT_TYPE},
    error::SubmitError,
    Confirmation, Order,
};

#[derive(Clone, Debug)]
pub struct Client {
    http_client: reqwest::Client,
    endpoint: Endpoint,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointConfigError {
    #[error("the endpoint url is missing")]
    MissingEndpoint,
    #[error("invalid endpoint url `{0}`: {1}")]
    InvalidUrl(String, String),
    #[error("unsupported scheme `{0}`, expected http or https")]
    UnsupportedScheme(String),
}

impl Endpoint {
    pub fn try_new(url: &str) -> Result<Self, EndpointConfigError> {
        if url.is_empty() {
            return Err(EndpointConfigError::MissingEndpoint);
        }
        let url = Url::parse(url)
            .map_err(|err| EndpointConfigError::InvalidUrl(url.to_string(), err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EndpointConfigError::UnsupportedScheme(
                url.scheme().to_string(),
            ));
        }
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[derive(Debug, Error)]
pub enum ClientInitError {
    #[error("invalid endpoint configuration: {0}")]
    InvalidEndpointConfig(#[from] EndpointConfigError),
}

impl Client {
    /// Create a client posting to `endpoint`, or to the default order endpoint when `None`.
    pub fn new(
        http_client: reqwest::Client,
        endpoint: Option<Endpoint>,
    ) -> Result<Self, ClientInitError> {
        let endpoint = match endpoint {
            Some(endpoint) => endpoint,
            None => Endpoint::try_new(DEFAULT_ORDER_ENDPOINT)?,
        };
        Ok(Self {
            http_client,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Send the order and build a confirmation from the server's reply.
    ///
    /// Makes a single attempt. The confirmation describes the order the server
    /// echoed back, not the one submitted.
    pub async fn submit(&self, order: &Order) -> Result<Confirmation, SubmitError> {
        if let Err(err) = order.validate() {
            warn!(%err, "refusing to submit order");
            return Err(err.into());
        }
        let body = order.encode().map_err(|err| {
            error!(%err, "failed to encode order");
            SubmitError::EncodeError(err)
        })?;

        debug!(endpoint = %self.endpoint.url, bytes = body.len(), "submitting order");
        let response = self
            .http_client
            .post(self.endpoint.url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .inspect_err(|err| error!(%err, "order request failed"))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .inspect_err(|err| error!(%err, "no data in order response"))?;

        match Order::decode(&body).and_then(Confirmation::try_from) {
            Ok(confirmation) => {
                info!(%status, message = %confirmation.message, "order confirmed");
                Ok(confirmation)
            }
            Err(source) => {
                let body = String::from_utf8_lossy(&body).into_owned();
                warn!(%status, %body, %source, "invalid order response");
                Err(SubmitError::InvalidResponseError {
                    status,
                    body,
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, ValidationError};
    use httpmock::prelude::*;
    use serde_json::{json, Value};

    const ORDER_PATH: &str = "/api/coffee";

    fn filled_order() -> Order {
        Order {
            drink_type: 1,
            quantity: 2,
            extra_sugar: true,
            name: "Shane".to_string(),
            address: "1 Bean Street".to_string(),
            phone_number: "0123456789".to_string(),
            city: "London".to_string(),
            post_code: "E1 6AN".to_string(),
            ..Order::default()
        }
    }

    fn wire_json(drink_type: usize, quantity: u32) -> Value {
        json!({
            "type": drink_type,
            "quantity": quantity,
            "extraSugar": true,
            "extraMilk": false,
            "name": "Shane",
            "address": "1 Bean Street",
            "phoneNumber": "0123456789",
            "city": "London",
            "postCode": "E1 6AN"
        })
    }

    fn client_for(server: &MockServer) -> Client {
        let endpoint = Endpoint::try_new(&server.url(ORDER_PATH)).unwrap();
        Client::new(reqwest::Client::new(), Some(endpoint)).unwrap()
    }

    #[test]
    fn endpoint_try_new_success() {
        let endpoint = Endpoint::try_new("https://example.com/api/coffee");
        assert!(endpoint.is_ok());
        assert_eq!(endpoint.unwrap().url().path(), "/api/coffee");
    }

    #[test]
    fn endpoint_try_new_missing_endpoint() {
        assert_eq!(
            Endpoint::try_new(""),
            Err(EndpointConfigError::MissingEndpoint)
        );
    }

    #[test]
    fn endpoint_try_new_invalid_url() {
        assert!(matches!(
            Endpoint::try_new("not a url"),
            Err(EndpointConfigError::InvalidUrl(_, _))
        ));
    }

    #[test]
    fn endpoint_try_new_unsupported_scheme() {
        assert_eq!(
            Endpoint::try_new("ftp://example.com/coffee"),
            Err(EndpointConfigError::UnsupportedScheme("ftp".to_string()))
        );
    }

    #[test]
    fn new_without_endpoint_uses_default() {
        let client = Client::new(reqwest::Client::new(), None).unwrap();
        assert_eq!(client.endpoint().url().as_str(), DEFAULT_ORDER_ENDPOINT);
    }

    #[tokio::test]
    async fn submit_success() {
        // Arrange
        let server = MockServer::start_async().await;
        let mut response_json = wire_json(1, 2);
        response_json["id"] = json!("417");
        response_json["createdAt"] = json!("2020-07-04T10:00:00.000Z");
        let order_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(ORDER_PATH)
                    .header("Content-Type", JSON_CONTENT_TYPE)
                    .json_body(wire_json(1, 2));
                then.status(201).json_body(response_json);
            })
            .await;
        let client = client_for(&server);

        // Act
        let confirmation = client.submit(&filled_order()).await;

        // Assert
        assert!(
            confirmation.is_ok(),
            "Failed to submit order: {:?}",
            confirmation.unwrap_err()
        );
        let confirmation = confirmation.unwrap();
        assert_eq!(
            confirmation.message,
            "Your Order for 2 x latte coffee is on its way"
        );
        assert_eq!(confirmation.order, filled_order());
        order_mock.assert();
    }

    #[tokio::test]
    async fn submit_message_uses_server_values() {
        // Arrange
        let server = MockServer::start_async().await;
        let order_mock = server
            .mock_async(|when, then| {
                when.method(POST).path(ORDER_PATH);
                then.status(201).json_body(wire_json(2, 3));
            })
            .await;
        let client = client_for(&server);

        // Act
        let confirmation = client.submit(&filled_order()).await.unwrap();

        // Assert
        assert_eq!(
            confirmation.message,
            "Your Order for 3 x americano coffee is on its way"
        );
        assert_eq!(confirmation.order.drink_type, 2);
        order_mock.assert();
    }

    #[tokio::test]
    async fn submit_invalid_order_sends_nothing() {
        // Arrange
        let server = MockServer::start_async().await;
        let order_mock = server
            .mock_async(|when, then| {
                when.method(POST).path(ORDER_PATH);
                then.status(201).json_body(wire_json(1, 2));
            })
            .await;
        let client = client_for(&server);
        let order = Order {
            name: String::new(),
            ..filled_order()
        };

        // Act
        let confirmation = client.submit(&order).await;

        // Assert
        assert!(matches!(
            confirmation.unwrap_err(),
            SubmitError::ValidationError(ValidationError::MissingFields(fields)) if fields == vec!["name"]
        ));
        order_mock.assert_hits(0);
    }

    #[tokio::test]
    async fn submit_out_of_range_order_sends_nothing() {
        // Arrange
        let server = MockServer::start_async().await;
        let order_mock = server
            .mock_async(|when, then| {
                when.method(POST).path(ORDER_PATH);
                then.status(201).json_body(wire_json(1, 2));
            })
            .await;
        let client = client_for(&server);
        let order = Order {
            quantity: 21,
            ..filled_order()
        };

        // Act
        let confirmation = client.submit(&order).await;

        // Assert
        assert!(matches!(
            confirmation.unwrap_err(),
            SubmitError::ValidationError(ValidationError::QuantityOutOfRange(21))
        ));
        order_mock.assert_hits(0);
    }

    #[tokio::test]
    async fn submit_invalid_url() {
        // Arrange
        let endpoint = Endpoint::try_new("http://test.invalid").unwrap();
        let client = Client::new(reqwest::Client::new(), Some(endpoint)).unwrap();

        // Act
        let confirmation = client.submit(&filled_order()).await;

        // Assert
        assert!(confirmation.is_err());
        assert!(matches!(confirmation.unwrap_err(), SubmitError::RequestError(_)));
    }

    #[tokio::test]
    async fn submit_non_json_response() {
        // Arrange
        let server = MockServer::start_async().await;
        let order_mock = server
            .mock_async(|when, then| {
                when.method(POST).path(ORDER_PATH);
                then.status(200).body("not json at all");
            })
            .await;
        let client = client_for(&server);

        // Act
        let confirmation = client.submit(&filled_order()).await;

        // Assert
        match confirmation.unwrap_err() {
            SubmitError::InvalidResponseError {
                status,
                body,
                source,
            } => {
                assert_eq!(status, reqwest::StatusCode::OK);
                assert_eq!(body, "not json at all");
                assert!(matches!(source, DecodeError::ParseError(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        order_mock.assert();
    }

    #[tokio::test]
    async fn submit_wrong_shape_response() {
        // Arrange
        let server = MockServer::start_async().await;
        let order_mock = server
            .mock_async(|when, then| {
                when.method(POST).path(ORDER_PATH);
                then.status(400)
                    .header("Content-Type", "application/json")
                    .body(r#"{"error": "something is amiss" }"#);
            })
            .await;
        let client = client_for(&server);

        // Act
        let confirmation = client.submit(&filled_order()).await;

        // Assert
        match confirmation.unwrap_err() {
            SubmitError::InvalidResponseError { status, body, .. } => {
                assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
                assert_eq!(body, r#"{"error": "something is amiss" }"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        order_mock.assert();
    }

    #[tokio::test]
    async fn submit_out_of_range_response() {
        // Arrange
        let server = MockServer::start_async().await;
        let order_mock = server
            .mock_async(|when, then| {
                when.method(POST).path(ORDER_PATH);
                then.status(201).json_body(wire_json(12, 2));
            })
            .await;
        let client = client_for(&server);

        // Act
        let confirmation = client.submit(&filled_order()).await;

        // Assert
        assert!(matches!(
            confirmation.unwrap_err(),
            SubmitError::InvalidResponseError {
                source: DecodeError::DrinkTypeOutOfRange(12),
                ..
            }
        ));
        order_mock.assert();
    }
}
