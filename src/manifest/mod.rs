//! Manifest document model and parser.
//!
//! A manifest looks like:
//!
//! ```xml
//! <manifest>
//!   <default branch="main" fetch="https://host/group/" />
//!   <project origin="https://host/group/root.git" branch="main">
//!     <include module="docs" />
//!   </project>
//!   <module name="lib" local="libs" origin="../lib.git" />
//! </manifest>
//! ```
//!
//! Modules named by an `include` element under `project` are skipped.

pub mod origin;
pub mod resolve;

use crate::error::ManifestError;

pub use resolve::Resolver;

/// Branch used when neither the element nor the defaults name one.
pub const DEFAULT_BRANCH: &str = "master";

/// Values of the optional `default` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defaults {
    /// Default branch for the project and its modules.
    pub branch: Option<String>,
    /// Base URL that a relative project origin resolves against.
    pub fetch: Option<String>,
}

/// The `project` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectElement {
    /// Origin as written.
    pub origin: String,
    /// Explicit branch, if any.
    pub branch: Option<String>,
    /// Module names excluded from this workspace.
    pub excluded: Vec<String>,
}

/// One `module` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleElement {
    /// Directory name of the module.
    pub name: String,
    /// Parent directory, relative to the workspace.
    pub local: Option<String>,
    /// Origin as written.
    pub origin: String,
    /// Explicit branch, if any.
    pub branch: Option<String>,
}

impl ModuleElement {
    /// Workspace-relative path: `local` (default `./`) joined with `name`.
    #[must_use]
    pub fn path(&self) -> String {
        let local = self.local.as_deref().unwrap_or("./");
        if local.ends_with('/') {
            format!("{local}{}", self.name)
        } else {
            format!("{local}/{}", self.name)
        }
    }
}

/// A parsed manifest, modules in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// The `default` element, or empty defaults.
    pub defaults: Defaults,
    /// The `project` element.
    pub project: ProjectElement,
    /// Every `module` element, including excluded ones.
    pub modules: Vec<ModuleElement>,
}

impl Manifest {
    /// Parses manifest XML.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] if the document is not well-formed, has
    /// more than one `default` or `project` element, has no `project`, or
    /// omits a required attribute.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let document = roxmltree::Document::parse(text)?;
        let root = document.root_element();

        let defaults = match single(root, "default")? {
            Some(node) => Defaults {
                branch: attr(node, "branch"),
                fetch: attr(node, "fetch"),
            },
            None => Defaults::default(),
        };

        let project_node =
            single(root, "project")?.ok_or(ManifestError::MissingElement { element: "project" })?;
        let project = ProjectElement {
            origin: required(project_node, "project", "origin")?,
            branch: attr(project_node, "branch"),
            excluded: project_node
                .descendants()
                .filter(|n| n.has_tag_name("include"))
                .filter_map(|n| attr(n, "module"))
                .collect(),
        };

        let modules = root
            .descendants()
            .filter(|n| n.has_tag_name("module"))
            .map(|node| {
                Ok(ModuleElement {
                    name: required(node, "module", "name")?,
                    local: attr(node, "local"),
                    origin: required(node, "module", "origin")?,
                    branch: attr(node, "branch"),
                })
            })
            .collect::<Result<Vec<_>, ManifestError>>()?;

        Ok(Self {
            defaults,
            project,
            modules,
        })
    }

    /// Returns `true` if the project excludes the module called `name`.
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        self.project.excluded.iter().any(|n| n == name)
    }

    /// Effective project branch: explicit, then default, then `master`.
    #[must_use]
    pub fn project_branch(&self) -> &str {
        self.project
            .branch
            .as_deref()
            .or(self.defaults.branch.as_deref())
            .unwrap_or(DEFAULT_BRANCH)
    }

    /// Effective module branch: explicit, then default, then project branch.
    #[must_use]
    pub fn module_branch<'a>(&'a self, module: &'a ModuleElement) -> &'a str {
        module
            .branch
            .as_deref()
            .or(self.defaults.branch.as_deref())
            .unwrap_or_else(|| self.project_branch())
    }
}

fn single<'a, 'input>(
    root: roxmltree::Node<'a, 'input>,
    element: &'static str,
) -> Result<Option<roxmltree::Node<'a, 'input>>, ManifestError> {
    let mut matches = root.descendants().filter(|n| n.has_tag_name(element));
    let first = matches.next();
    if matches.next().is_some() {
        return Err(ManifestError::Duplicate { element });
    }
    Ok(first)
}

fn attr(node: roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name).map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn required(
    node: roxmltree::Node<'_, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<String, ManifestError> {
    attr(node, attribute).ok_or(ManifestError::MissingAttribute { element, attribute })
}
