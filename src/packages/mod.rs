//! Template dependency filtering and installation.
mod repository;

pub use repository::RepositoryInstaller;

use anyhow::Result;

use crate::logging::Log;
use crate::workspace::Workspace;

/// Installs packages into a workspace.
#[cfg_attr(test, mockall::automock)]
pub trait PackageInstaller {
    /// Install `packages` (each `repo/name`) into `workspace`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::DependencyInstall`](crate::error::ProvisionError)
    /// naming the first package that could not be installed.
    fn install(&self, workspace: &Workspace, packages: &[String]) -> Result<()>;
}

/// Declared dependencies minus exclusions, in declaration order, each at most
/// once.
///
/// # Examples
///
/// ```
/// use knightos_sdk::packages::effective_install_list;
///
/// let declared = ["core/init", "core/corelib", "core/init"].map(String::from);
/// let excluded = ["core/corelib".to_string()];
/// assert_eq!(effective_install_list(&declared, &excluded), ["core/init"]);
/// ```
#[must_use]
pub fn effective_install_list(declared: &[String], excluded: &[String]) -> Vec<String> {
    let mut list: Vec<String> = Vec::with_capacity(declared.len());
    for name in declared {
        if !excluded.contains(name) && !list.contains(name) {
            list.push(name.clone());
        }
    }
    list
}

/// Install the template's dependencies, then reconcile the workspace's own
/// declared dependencies. Returns the list handed to the installer.
///
/// # Errors
///
/// Propagates installer and configuration failures.
pub fn install_dependencies(
    workspace: &Workspace,
    declared: &[String],
    excluded: &[String],
    installer: &dyn PackageInstaller,
    log: &dyn Log,
) -> Result<Vec<String>> {
    let list = effective_install_list(declared, excluded);
    for name in declared.iter().filter(|n| excluded.contains(n)) {
        log.debug(&format!("excluding template dependency {name}"));
    }
    if list.is_empty() {
        log.debug("template declares no packages to install");
    } else {
        log.info(&format!("installing {}", list.join(", ")));
        installer.install(workspace, &list)?;
    }
    workspace.ensure_packages_consistent(installer, log)?;
    Ok(list)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::ProvisionError;
    use crate::tasks::test_helpers::NullLog;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn exclusions_are_removed_in_order() {
        let declared = names(&["core/init", "core/corelib", "extra/fonts", "core/castle"]);
        let excluded = names(&["extra/fonts", "core/init"]);
        assert_eq!(
            effective_install_list(&declared, &excluded),
            names(&["core/corelib", "core/castle"])
        );
    }

    #[test]
    fn unknown_exclusions_are_ignored() {
        let declared = names(&["core/init"]);
        assert_eq!(
            effective_install_list(&declared, &names(&["not/declared"])),
            declared
        );
    }

    #[test]
    fn duplicates_collapse() {
        let declared = names(&["a/b", "c/d", "a/b"]);
        assert_eq!(effective_install_list(&declared, &[]), names(&["a/b", "c/d"]));
    }

    #[test]
    fn empty_inputs() {
        assert!(effective_install_list(&[], &names(&["a/b"])).is_empty());
    }

    #[test]
    fn driver_installs_filtered_list() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::new(tmp.path());
        let mut installer = MockPackageInstaller::new();
        installer
            .expect_install()
            .withf(|_, list| list.iter().map(String::as_str).eq(["core/init"]))
            .times(1)
            .returning(|_, _| Ok(()));

        let list = install_dependencies(
            &ws,
            &names(&["core/init", "core/corelib"]),
            &names(&["core/corelib"]),
            &installer,
            &NullLog,
        )
        .unwrap();
        assert_eq!(list, names(&["core/init"]));
    }

    #[test]
    fn driver_skips_installer_when_everything_is_excluded() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::new(tmp.path());
        let installer = MockPackageInstaller::new();
        let list = install_dependencies(
            &ws,
            &names(&["core/init"]),
            &names(&["core/init"]),
            &installer,
            &NullLog,
        )
        .unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn driver_propagates_install_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::new(tmp.path());
        let mut installer = MockPackageInstaller::new();
        installer.expect_install().returning(|_, _| {
            Err(ProvisionError::DependencyInstall {
                package: "core/init".to_string(),
                source: "404".into(),
            }
            .into())
        });
        let err = install_dependencies(&ws, &names(&["core/init"]), &[], &installer, &NullLog)
            .expect_err("failure");
        assert!(matches!(
            err.downcast_ref::<ProvisionError>(),
            Some(ProvisionError::DependencyInstall { .. })
        ));
    }
}
