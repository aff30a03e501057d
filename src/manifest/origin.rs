//! Origin URL algebra: classification, normalization, and relative resolution.
//!
//! Two absolute shapes are understood:
//!
//! - scheme URLs (`https://host/group/repo.git`, `ssh://`, `git://`, `http://`),
//!   where the authority is everything up to the first `/` after `://`;
//! - scp-style SSH (`git@host:group/repo.git`), where the authority is
//!   everything before the first `:`.
//!
//! Only the path component is ever rewritten.

use crate::error::ManifestError;

const SCHEMES: &[&str] = &["https://", "http://", "ssh://", "git://"];
const GIT_SUFFIX: &str = ".git";

/// An absolute origin split into its untouched authority and its path.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Parts<'a> {
    authority: &'a str,
    path: &'a str,
    scp: bool,
}

impl Parts<'_> {
    fn join(&self, path: &str) -> String {
        if self.scp {
            format!("{}:{path}", self.authority)
        } else {
            format!("{}{path}", self.authority)
        }
    }

    /// Collapses dot segments, clamping at the top of the path.
    ///
    /// scp paths without a leading `/` are relative to the login directory
    /// and stay that way.
    fn collapse(&self, path: &str) -> String {
        if self.scp && !self.path.starts_with('/') {
            let rooted = remove_dot_segments(&format!("/{path}"));
            rooted.strip_prefix('/').unwrap_or(&rooted).to_string()
        } else {
            remove_dot_segments(path)
        }
    }
}

/// Returns `true` if `origin` is an absolute URL rather than a relative reference.
#[must_use]
pub fn is_absolute(origin: &str) -> bool {
    SCHEMES.iter().any(|s| origin.starts_with(s)) || scp_split(origin).is_some()
}

fn scp_split(origin: &str) -> Option<(&str, &str)> {
    if origin.contains("://") {
        return None;
    }
    let (authority, path) = origin.split_once(':')?;
    let (user, host) = authority.split_once('@')?;
    (!user.is_empty() && !host.is_empty() && !host.contains('/')).then_some((authority, path))
}

fn invalid(origin: &str, reason: &str) -> ManifestError {
    ManifestError::InvalidOrigin {
        origin: origin.to_string(),
        reason: reason.to_string(),
    }
}

fn split(origin: &str) -> Result<Parts<'_>, ManifestError> {
    if origin.trim().is_empty() {
        return Err(invalid(origin, "origin is empty"));
    }
    if origin.chars().any(char::is_whitespace) {
        return Err(invalid(origin, "origin contains whitespace"));
    }
    if origin.contains(['?', '#']) {
        return Err(invalid(origin, "query strings and fragments are not supported"));
    }

    if let Some(scheme) = SCHEMES.iter().find(|s| origin.starts_with(*s)) {
        let rest = &origin[scheme.len()..];
        let Some(slash) = rest.find('/') else {
            return Err(invalid(origin, "missing repository path"));
        };
        if slash == 0 {
            return Err(invalid(origin, "missing host"));
        }
        let cut = scheme.len() + slash;
        return Ok(Parts {
            authority: &origin[..cut],
            path: &origin[cut..],
            scp: false,
        });
    }

    if let Some((authority, path)) = scp_split(origin) {
        return Ok(Parts {
            authority,
            path,
            scp: true,
        });
    }

    if origin.contains("://") {
        return Err(invalid(origin, "unsupported scheme"));
    }
    Err(invalid(origin, "not an absolute http(s), ssh, git or user@host:path origin"))
}

fn with_git_suffix(origin: &str, path: &str) -> Result<String, ManifestError> {
    let last = path.rsplit('/').next().unwrap_or_default();
    if last.is_empty() || last == GIT_SUFFIX {
        return Err(invalid(origin, "path does not name a repository"));
    }
    if path.ends_with(GIT_SUFFIX) {
        Ok(path.to_string())
    } else {
        Ok(format!("{path}{GIT_SUFFIX}"))
    }
}

/// Normalizes an absolute origin: collapses `.` and `..` path segments and
/// ensures a `.git` suffix.
///
/// # Errors
///
/// Returns [`ManifestError::InvalidOrigin`] if the origin is not absolute,
/// uses an unknown scheme, or has no repository path.
pub fn normalize(origin: &str) -> Result<String, ManifestError> {
    let parts = split(origin)?;
    let path = parts.collapse(parts.path);
    let path = with_git_suffix(origin, &path)?;
    Ok(parts.join(&path))
}

/// Resolves a relative origin (`./x`, `../x.git`) against an absolute base.
///
/// The base repository is treated as a directory, so `../sibling` next to
/// `https://host/group/project.git` names `https://host/group/sibling.git`.
/// Resolution follows RFC 3986 reference merging on the path component only.
///
/// # Errors
///
/// Returns [`ManifestError::InvalidOrigin`] if `reference` does not start
/// with `.`, and [`ManifestError::UnresolvableOrigin`] if `base` is not a
/// usable absolute origin.
pub fn resolve_relative(reference: &str, base: &str) -> Result<String, ManifestError> {
    if !reference.starts_with('.') {
        return Err(invalid(reference, "relative origins must start with './' or '../'"));
    }
    if reference.contains(['?', '#']) {
        return Err(invalid(reference, "query strings and fragments are not supported"));
    }
    let parts = split(base).map_err(|e| ManifestError::UnresolvableOrigin {
        origin: reference.to_string(),
        reason: format!("base {base:?} is unusable: {e}"),
    })?;

    let reference = reference.strip_suffix(GIT_SUFFIX).unwrap_or(reference);
    let base_dir = parts.path.strip_suffix(GIT_SUFFIX).unwrap_or(parts.path);
    let separator = if base_dir.ends_with('/') || base_dir.is_empty() { "" } else { "/" };
    let merged = format!("{base_dir}{separator}{reference}");

    let path = parts.collapse(&merged);
    let path = with_git_suffix(reference, &path)?;
    Ok(parts.join(&path))
}

/// Resolves `origin` to an absolute, normalized URL, using `base` for
/// relative references.
///
/// # Errors
///
/// Returns [`ManifestError::UnresolvableOrigin`] if `origin` is relative and
/// there is no base, plus anything [`normalize`] or [`resolve_relative`] raise.
pub fn resolve(origin: &str, base: Option<&str>) -> Result<String, ManifestError> {
    if is_absolute(origin) {
        return normalize(origin);
    }
    if !origin.starts_with('.') {
        return Err(invalid(origin, "relative origins must start with './' or '../'"));
    }
    match base {
        Some(base) => resolve_relative(origin, base),
        None => Err(ManifestError::UnresolvableOrigin {
            origin: origin.to_string(),
            reason: "no absolute origin to resolve against".to_string(),
        }),
    }
}

/// RFC 3986 section 5.2.4 `remove_dot_segments`.
#[must_use]
pub fn remove_dot_segments(path: &str) -> String {
    let mut input = path;
    let mut output = String::with_capacity(path.len());

    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") || input == "/.." {
            input = if input == "/.." { "/" } else { &input[3..] };
            truncate_last_segment(&mut output);
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let start = usize::from(input.starts_with('/'));
            let end = input[start..].find('/').map_or(input.len(), |i| i + start);
            output.push_str(&input[..end]);
            input = &input[end..];
        }
    }

    output
}

fn truncate_last_segment(output: &mut String) {
    match output.rfind('/') {
        Some(i) => output.truncate(i),
        None => output.clear(),
    }
}
