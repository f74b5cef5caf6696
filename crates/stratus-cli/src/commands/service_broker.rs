//! Service broker commands.

use std::io::Write;

use stratus_actor::Actor;
use stratus_api::ControlPlaneClient;
use stratus_session::Session;

use crate::cli::CreateServiceBrokerArgs;
use crate::error::CliError;
use crate::output::{OutputFormat, ServiceBrokerList, write_warnings};

/// Service broker command executor.
pub struct ServiceBrokerCommand<C> {
    actor: Actor<C>,
}

impl<C: ControlPlaneClient> ServiceBrokerCommand<C> {
    /// Create a new service broker command.
    #[must_use]
    pub const fn new(actor: Actor<C>) -> Self {
        Self { actor }
    }

    /// Runs `stratus create-service-broker`.
    ///
    /// `--space-scoped` registers the broker in the space targeted by
    /// `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if no space is targeted for a space-scoped broker or
    /// the broker cannot be created.
    pub async fn create<W: Write, E: Write>(
        &self,
        out: &mut W,
        err: &mut E,
        format: &OutputFormat,
        args: &CreateServiceBrokerArgs,
        session: &Session,
    ) -> Result<(), CliError> {
        let space_guid = if args.space_scoped {
            let space = session.space.as_ref().ok_or(CliError::NoSpaceTargeted)?;
            Some(space.guid.as_str())
        } else {
            None
        };

        format.status(out, &format!("Creating service broker {}...", args.name))?;
        let outcome = self
            .actor
            .create_service_broker(
                &args.name,
                &args.username,
                &args.password,
                &args.url,
                space_guid,
            )
            .await;
        write_warnings(err, &outcome.warnings)?;
        let broker = outcome.result?;
        format.status(out, "OK")?;
        if format.is_json() {
            format.write(out, &broker)?;
        }
        Ok(())
    }

    /// Runs `stratus service-brokers`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    pub async fn list<W: Write, E: Write>(
        &self,
        out: &mut W,
        err: &mut E,
        format: &OutputFormat,
    ) -> Result<(), CliError> {
        let outcome = self.actor.service_brokers().await;
        write_warnings(err, &outcome.warnings)?;
        format.write(out, &ServiceBrokerList(outcome.result?))
    }

    /// Runs `stratus service-broker NAME`.
    ///
    /// # Errors
    ///
    /// Returns an error if no broker has that name.
    pub async fn show<W: Write, E: Write>(
        &self,
        out: &mut W,
        err: &mut E,
        format: &OutputFormat,
        name: &str,
    ) -> Result<(), CliError> {
        let outcome = self.actor.service_broker_by_name(name).await;
        write_warnings(err, &outcome.warnings)?;
        format.write(out, &outcome.result?)
    }
}
