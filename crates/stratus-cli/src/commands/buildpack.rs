//! Buildpack commands.

use std::io::Write;

use stratus_actor::Actor;
use stratus_api::{BuildpackRequest, ControlPlaneClient};

use crate::cli::CreateBuildpackArgs;
use crate::error::CliError;
use crate::output::{BuildpackList, OutputFormat, write_warnings};

/// Buildpack command executor.
pub struct BuildpackCommand<C> {
    actor: Actor<C>,
}

impl<C: ControlPlaneClient> BuildpackCommand<C> {
    /// Create a new buildpack command.
    #[must_use]
    pub const fn new(actor: Actor<C>) -> Self {
        Self { actor }
    }

    /// Runs `stratus create-buildpack`.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are invalid or creation fails.
    pub async fn create<W: Write, E: Write>(
        &self,
        out: &mut W,
        err: &mut E,
        format: &OutputFormat,
        args: &CreateBuildpackArgs,
    ) -> Result<(), CliError> {
        let request = BuildpackRequest {
            position: args.position,
            enabled: !args.disable,
            stack: args.stack.clone(),
            ..BuildpackRequest::new(args.name.clone())
        };

        format.status(out, &format!("Creating buildpack {}...", args.name))?;
        let outcome = self.actor.create_buildpack(&request).await;
        write_warnings(err, &outcome.warnings)?;
        let buildpack = outcome.result?;
        format.status(out, "OK")?;
        if format.is_json() {
            format.write(out, &buildpack)?;
        }
        Ok(())
    }

    /// Runs `stratus buildpacks`.
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
        let outcome = self.actor.buildpacks().await;
        write_warnings(err, &outcome.warnings)?;
        format.write(out, &BuildpackList(outcome.result?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use stratus_api::Buildpack;
    use stratus_api::fake::{Call, FakeControlPlaneClient};

    fn args(name: &str) -> CreateBuildpackArgs {
        CreateBuildpackArgs {
            name: name.into(),
            position: Some(2),
            disable: true,
            stack: Some("cflinuxfs4".into()),
        }
    }

    #[tokio::test]
    async fn create_maps_flags_onto_request() {
        let client = FakeControlPlaneClient::new();
        let calls = client.call_log();
        let cmd = BuildpackCommand::new(Actor::new(client));
        let (mut out, mut err) = (Vec::new(), Vec::new());
        cmd.create(
            &mut out,
            &mut err,
            &OutputFormat::new(Format::Table),
            &args("go_buildpack"),
        )
        .await
        .expect("create");

        let recorded = calls.calls();
        let [Call::CreateBuildpack(request)] = recorded.as_slice() else {
            panic!("expected create call");
        };
        assert_eq!(request.name, "go_buildpack");
        assert_eq!(request.position, Some(2));
        assert!(!request.enabled);
        assert!(!request.locked);
        assert_eq!(request.stack.as_deref(), Some("cflinuxfs4"));
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "Creating buildpack go_buildpack...\nOK\n"
        );
    }

    #[tokio::test]
    async fn invalid_name_fails_without_a_call() {
        let client = FakeControlPlaneClient::new();
        let calls = client.call_log();
        let cmd = BuildpackCommand::new(Actor::new(client));
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let error = cmd
            .create(
                &mut out,
                &mut err,
                &OutputFormat::new(Format::Table),
                &args("bad name!"),
            )
            .await
            .expect_err("invalid");
        assert!(matches!(
            error,
            CliError::Actor(stratus_actor::Error::InvalidArgument(_))
        ));
        assert!(calls.is_empty());
    }

    #[tokio::test]
    async fn list_is_ordered_by_position() {
        let buildpacks = vec![
            Buildpack {
                guid: "b2".into(),
                name: "second".into(),
                position: 2,
                ..Buildpack::default()
            },
            Buildpack {
                guid: "b1".into(),
                name: "first".into(),
                position: 1,
                ..Buildpack::default()
            },
        ];
        let client = FakeControlPlaneClient::new().with_buildpacks(Ok(buildpacks), ["deprecated stack"]);
        let cmd = BuildpackCommand::new(Actor::new(client));
        let (mut out, mut err) = (Vec::new(), Vec::new());
        cmd.list(&mut out, &mut err, &OutputFormat::new(Format::Table))
            .await
            .expect("list");

        let table = String::from_utf8(out).expect("utf8");
        let first = table.find("first").expect("first listed");
        let second = table.find("second").expect("second listed");
        assert!(first < second);
        assert_eq!(String::from_utf8(err).expect("utf8"), "deprecated stack\n");
    }
}
