//! Buildpack operations.
//!
//! Only the buildpack record is managed here; uploading buildpack bits is a
//! separate concern.

use stratus_api::{Buildpack, BuildpackRequest, ControlPlaneClient, Filter, Warned, Warnings};
use tracing::debug;

use crate::actor::{Actor, first_match};
use crate::error::{Error, Result, require};

impl<C: ControlPlaneClient> Actor<C> {
    /// Creates a buildpack record.
    pub async fn create_buildpack(&self, request: &BuildpackRequest) -> Warned<Buildpack, Error> {
        let mut warnings = Warnings::new();
        let result: Result<Buildpack> = async {
            validate_request(request)?;
            let buildpack = warnings.absorb(self.client().create_buildpack(request).await)?;
            debug!(
                guid = %buildpack.guid,
                name = %buildpack.name,
                position = buildpack.position,
                "created buildpack"
            );
            Ok(buildpack)
        }
        .await;
        Warned::new(result, warnings)
    }

    /// Lists every buildpack, ordered by position.
    pub async fn buildpacks(&self) -> Warned<Vec<Buildpack>, Error> {
        let mut warnings = Warnings::new();
        let result: Result<Vec<Buildpack>> = async {
            let mut buildpacks = warnings.absorb(self.client().buildpacks(&[]).await)?;
            buildpacks.sort_by_key(|b| b.position);
            Ok(buildpacks)
        }
        .await;
        Warned::new(result, warnings)
    }

    /// Finds a buildpack by name. The first of several matches wins.
    pub async fn buildpack_by_name(&self, name: &str) -> Warned<Buildpack, Error> {
        let mut warnings = Warnings::new();
        let result: Result<Buildpack> = async {
            require("buildpack name", name)?;
            let filter = Filter::name(name);
            let buildpacks = warnings.absorb(
                self.client()
                    .buildpacks(std::slice::from_ref(&filter))
                    .await,
            )?;
            first_match("buildpack", &filter, buildpacks).ok_or_else(|| Error::BuildpackNotFound {
                name: name.to_string(),
            })
        }
        .await;
        Warned::new(result, warnings)
    }
}

fn validate_request(request: &BuildpackRequest) -> Result<()> {
    require("buildpack name", &request.name)?;
    if request
        .name
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'))
    {
        return Err(Error::InvalidArgument(format!(
            "buildpack name '{}' may only contain letters, digits, '_', '-' and '.'",
            request.name
        )));
    }
    if request.position == Some(0) {
        return Err(Error::InvalidArgument(
            "buildpack position must be 1 or greater".to_string(),
        ));
    }
    if let Some(stack) = &request.stack {
        require("stack", stack)?;
    }
    Ok(())
}
