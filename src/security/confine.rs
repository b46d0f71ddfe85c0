use std::path::{Component, Path, PathBuf};

use crate::foundation::error::{FrameIoError, FrameIoResult};

/// Outcome of a confinement check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Confinement {
    /// The candidate resolves strictly inside the root. Carries the normalized absolute path.
    Admit(PathBuf),
    /// The candidate escapes the root.
    Reject {
        /// The normalized candidate.
        path: PathBuf,
        /// Human-readable reason.
        reason: String,
    },
}

impl Confinement {
    /// `true` for [`Confinement::Admit`].
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admit(_))
    }
}

/// The directory every write of one save invocation must stay inside.
///
/// The check is purely lexical: `.` and `..` are resolved without touching the filesystem, so a
/// symlink inside the root that points elsewhere is not detected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecurityRoot {
    root: PathBuf,
}

impl SecurityRoot {
    /// Establish a root. Relative roots are anchored at the current working directory.
    pub fn new(root: impl AsRef<Path>) -> FrameIoResult<Self> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() {
            return Err(FrameIoError::configuration("output root must be non-empty"));
        }
        let abs = std::path::absolute(root).map_err(|e| {
            FrameIoError::configuration(format!(
                "cannot resolve output root '{}': {e}",
                root.display()
            ))
        })?;
        Ok(Self {
            root: normalize_lexically(&abs),
        })
    }

    /// The normalized absolute root.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve `candidate` (relative candidates are joined onto the root) and check it.
    pub fn confine(&self, candidate: &Path) -> Confinement {
        confine(&self.root, &self.root.join(candidate))
    }

    /// Like [`SecurityRoot::confine`], mapping rejection to [`FrameIoError::PermissionDenied`].
    pub fn admit(&self, candidate: &Path) -> FrameIoResult<PathBuf> {
        match self.confine(candidate) {
            Confinement::Admit(path) => Ok(path),
            Confinement::Reject { path, reason } => Err(FrameIoError::PermissionDenied {
                path,
                root: self.root.clone(),
                reason,
            }),
        }
    }
}

/// Admit `candidate` iff the longest common ancestor of `root` and the normalized candidate is
/// exactly `root`, and the candidate is not the root itself.
///
/// Both paths are expected to be absolute. Paths on different volumes share no ancestor and are
/// always rejected.
pub fn confine(root: &Path, candidate: &Path) -> Confinement {
    let root = normalize_lexically(root);
    let resolved = normalize_lexically(candidate);

    if !resolved.is_absolute() || !root.is_absolute() {
        return Confinement::Reject {
            path: resolved,
            reason: "paths must be absolute".to_owned(),
        };
    }

    let common = common_ancestor(&root, &resolved);
    match common {
        None => Confinement::Reject {
            path: resolved,
            reason: "no common ancestor with the root (different volume)".to_owned(),
        },
        Some(ancestor) if ancestor != root => Confinement::Reject {
            path: resolved,
            reason: format!("resolves outside the root (common ancestor '{}')", ancestor.display()),
        },
        Some(_) if resolved == root => Confinement::Reject {
            path: resolved,
            reason: "target is the root directory itself".to_owned(),
        },
        Some(_) => Confinement::Admit(resolved),
    }
}

/// Resolve `.` and `..` components without consulting the filesystem.
///
/// `..` at the filesystem root stays at the root; leading `..` of a relative path are kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(comp),
            },
            other => parts.push(other),
        }
    }
    let mut out = PathBuf::new();
    for comp in parts {
        out.push(comp.as_os_str());
    }
    out
}

fn common_ancestor(a: &Path, b: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    let mut any = false;
    for (x, y) in a.components().zip(b.components()) {
        if x != y {
            break;
        }
        out.push(x.as_os_str());
        any = true;
    }
    any.then_some(out)
}

#[cfg(test)]
#[path = "../../tests/unit/security/confine.rs"]
mod tests;
