//! npm deployment with `ngx-deploy-npm`
//!
//! Adds a `deploy` target publishing the build output of each listed
//! project. The target comes with a provisional `configurations` block that
//! callers are expected to tailor.

use std::fmt;

use log::debug;
use serde_json::{json, Map};

use crate::defaults;
use crate::documents::DocumentStore;
use crate::error::{Error, Result};
use crate::package_json::add_dependencies_to_package_json;
use crate::project::{update_project_configuration, TargetConfiguration};
use crate::tasks::Task;

/// npm access level of published packages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Restricted,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Public => f.write_str("public"),
            Access::Restricted => f.write_str("restricted"),
        }
    }
}

/// Options of the deploy installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    pub projects: Vec<String>,
    pub access: Access,
}

/// Install the `deploy` target for `options.projects`
///
/// Every project must have a `build` target; its output is what gets
/// published.
pub fn generate(store: &mut DocumentStore, options: &DeployOptions) -> Result<Vec<Task>> {
    for project in &options.projects {
        debug!("adding deploy target to {}", project);
        update_project_configuration(store, project, |config| {
            if !config.has_target("build") {
                return Err(Error::resolution(
                    format!("{}:build", project),
                    "ngx-deploy-npm publishes the output of the build target, which does not exist",
                ));
            }
            config.set_target("deploy", &deploy_target(options.access))
        })?;
    }

    add_dependencies_to_package_json(
        store,
        &[],
        &[("ngx-deploy-npm", defaults::NGX_DEPLOY_NPM_VERSION)],
    )?;

    Ok(vec![Task::InstallPackages])
}

fn deploy_target(access: Access) -> TargetConfiguration {
    let mut target = TargetConfiguration::with_executor("ngx-deploy-npm:deploy");
    target
        .options
        .insert("access".to_string(), json!(access.to_string()));
    target.depends_on = vec![json!("build")];
    let mut configurations = Map::new();
    configurations.insert("dry-run".to_string(), json!({"dryRun": true}));
    target.configurations = configurations;
    target
}
