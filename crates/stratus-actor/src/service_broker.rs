//! Service broker operations.

use stratus_api::{ControlPlaneClient, Filter, ServiceBroker, Warned, Warnings};
use tracing::debug;

use crate::actor::{Actor, first_match};
use crate::error::{Error, Result, require};

impl<C: ControlPlaneClient> Actor<C> {
    /// Registers a service broker.
    ///
    /// The five values are passed to the client unchanged. `space_guid`
    /// scopes the broker to one space.
    pub async fn create_service_broker(
        &self,
        name: &str,
        username: &str,
        password: &str,
        url: &str,
        space_guid: Option<&str>,
    ) -> Warned<ServiceBroker, Error> {
        let mut warnings = Warnings::new();
        let result: Result<ServiceBroker> = async {
            require("service broker name", name)?;
            require("username", username)?;
            require("password", password)?;
            validate_broker_url(url)?;
            if let Some(guid) = space_guid {
                require("space GUID", guid)?;
            }

            let broker = warnings.absorb(
                self.client()
                    .create_service_broker(name, username, password, url, space_guid)
                    .await,
            )?;
            debug!(guid = %broker.guid, name, "created service broker");
            Ok(broker)
        }
        .await;
        Warned::new(result, warnings)
    }

    /// Lists every visible service broker.
    pub async fn service_brokers(&self) -> Warned<Vec<ServiceBroker>, Error> {
        let mut warnings = Warnings::new();
        let result: Result<Vec<ServiceBroker>> = async {
            Ok(warnings.absorb(self.client().service_brokers(&[]).await)?)
        }
        .await;
        Warned::new(result, warnings)
    }

    /// Finds a service broker by name.
    ///
    /// Fails with [`Error::ServiceBrokerNotFound`] when nothing matches; the
    /// first of several matches wins.
    pub async fn service_broker_by_name(&self, name: &str) -> Warned<ServiceBroker, Error> {
        let mut warnings = Warnings::new();
        let result: Result<ServiceBroker> = async {
            require("service broker name", name)?;
            let filter = Filter::name(name);
            let brokers = warnings.absorb(
                self.client()
                    .service_brokers(std::slice::from_ref(&filter))
                    .await,
            )?;
            first_match("service broker", &filter, brokers).ok_or_else(|| {
                Error::ServiceBrokerNotFound {
                    name: name.to_string(),
                }
            })
        }
        .await;
        Warned::new(result, warnings)
    }
}

fn validate_broker_url(raw: &str) -> Result<()> {
    require("broker URL", raw)?;
    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(parsed) => Err(Error::InvalidArgument(format!(
            "broker URL must use http or https, got '{}'",
            parsed.scheme()
        ))),
        Err(e) => Err(Error::InvalidArgument(format!("invalid broker URL '{raw}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stratus_api::fake::{Call, FakeControlPlaneClient};
    use stratus_api::{ApiError, FilterKind, FilterOperator};
    use test_case::test_case;

    fn broker(guid: &str, name: &str) -> ServiceBroker {
        ServiceBroker {
            guid: guid.into(),
            name: name.into(),
            ..ServiceBroker::default()
        }
    }

    #[tokio::test]
    async fn create_forwards_values_once() {
        let client = FakeControlPlaneClient::new();
        let log = client.call_log();
        let actor = Actor::new(client);

        let outcome = actor
            .create_service_broker(
                "broker-name",
                "username",
                "password",
                "https://broker.com",
                Some("some-space-guid"),
            )
            .await;

        assert!(outcome.result.is_ok());
        assert_eq!(
            log.calls(),
            vec![Call::CreateServiceBroker {
                name: "broker-name".into(),
                username: "username".into(),
                password: "password".into(),
                url: "https://broker.com".into(),
                space_guid: Some("some-space-guid".into()),
            }]
        );
    }

    #[tokio::test]
    async fn create_returns_broker_and_warnings() {
        let client = FakeControlPlaneClient::new().with_create_service_broker(
            Ok(broker("some-broker-guid", "broker-name")),
            ["a-warning", "another-warning"],
        );
        let actor = Actor::new(client);

        let outcome = actor
            .create_service_broker("broker-name", "username", "password", "https://broker.com", None)
            .await;

        assert_eq!(outcome.result.expect("created").guid, "some-broker-guid");
        assert_eq!(
            outcome.warnings,
            Warnings::from(["a-warning", "another-warning"])
        );
    }

    #[tokio::test]
    async fn create_failure_keeps_warnings_and_error() {
        let client = FakeControlPlaneClient::new().with_create_service_broker(
            Err(ApiError::remote(400, "error creating broker")),
            ["one-warning", "two-warnings"],
        );
        let actor = Actor::new(client);

        let outcome = actor
            .create_service_broker("broker-name", "username", "password", "https://broker.com", None)
            .await;

        assert_eq!(outcome.warnings, Warnings::from(["one-warning", "two-warnings"]));
        let err = outcome.result.expect_err("should fail");
        assert_eq!(err.to_string(), "error creating broker");
        assert_eq!(err, Error::Api(ApiError::remote(400, "error creating broker")));
    }

    #[test_case("", "username", "password", "https://broker.com" ; "blank name")]
    #[test_case("broker", "", "password", "https://broker.com" ; "blank username")]
    #[test_case("broker", "username", "", "https://broker.com" ; "blank password")]
    #[test_case("broker", "username", "password", "" ; "blank url")]
    #[test_case("broker", "username", "password", "not a url" ; "malformed url")]
    #[test_case("broker", "username", "password", "ftp://broker.com" ; "unsupported scheme")]
    fn invalid_input_never_reaches_the_client(name: &str, user: &str, pass: &str, url: &str) {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let client = FakeControlPlaneClient::new();
        let log = client.call_log();
        let actor = Actor::new(client);

        let outcome =
            runtime.block_on(actor.create_service_broker(name, user, pass, url, None));

        assert!(matches!(outcome.result, Err(Error::InvalidArgument(_))));
        assert!(outcome.warnings.is_empty());
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn lookup_by_name_sends_equality_filter() {
        let client = FakeControlPlaneClient::new().with_service_brokers(
            Ok(vec![broker("first-guid", "my-broker"), broker("second-guid", "my-broker")]),
            ["list-warning"],
        );
        let log = client.call_log();
        let actor = Actor::new(client);

        let outcome = actor.service_broker_by_name("my-broker").await;

        assert_eq!(outcome.result.expect("found").guid, "first-guid");
        assert_eq!(outcome.warnings, Warnings::from(["list-warning"]));

        let calls = log.calls();
        assert_eq!(calls.len(), 1);
        let Call::ServiceBrokers(filters) = &calls[0] else {
            panic!("expected a service broker listing, got {calls:?}");
        };
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].kind(), FilterKind::Name);
        assert_eq!(filters[0].operator(), FilterOperator::Equal);
        assert_eq!(filters[0].values(), ["my-broker".to_string()]);
    }

    #[tokio::test]
    async fn lookup_without_match_is_not_found() {
        let client = FakeControlPlaneClient::new()
            .with_service_brokers(Ok(Vec::new()), ["empty-warning"]);
        let actor = Actor::new(client);

        let outcome = actor.service_broker_by_name("missing").await;

        assert_eq!(outcome.warnings, Warnings::from(["empty-warning"]));
        assert_eq!(
            outcome.result,
            Err(Error::ServiceBrokerNotFound {
                name: "missing".into()
            })
        );
    }

    #[tokio::test]
    async fn listing_passes_through_errors() {
        let client = FakeControlPlaneClient::new()
            .with_service_brokers(Err(ApiError::Transport("boom".into())), ["w"]);
        let log = client.call_log();
        let actor = Actor::new(client);

        let outcome = actor.service_brokers().await;

        assert_eq!(outcome.result, Err(Error::Api(ApiError::Transport("boom".into()))));
        assert_eq!(outcome.warnings, Warnings::from(["w"]));
        assert_eq!(log.calls(), vec![Call::ServiceBrokers(Vec::new())]);
    }

    proptest! {
        #[test]
        fn create_warnings_match_client_warnings(
            warnings in proptest::collection::vec("[a-z -]{1,12}", 0..6),
            fail in any::<bool>(),
        ) {
            let runtime = tokio::runtime::Runtime::new().expect("runtime");
            let reply = if fail {
                Err(ApiError::remote(500, "failed"))
            } else {
                Ok(broker("guid", "name"))
            };
            let client = FakeControlPlaneClient::new()
                .with_create_service_broker(reply, Warnings::from(warnings.clone()));
            let actor = Actor::new(client);

            let outcome = runtime.block_on(actor.create_service_broker(
                "name", "user", "pass", "https://broker.com", None,
            ));

            prop_assert_eq!(outcome.warnings.into_vec(), warnings);
            prop_assert_eq!(outcome.result.is_err(), fail);
        }
    }
}
