//! Local checkout path rules.
//!
//! Every local path handled by the mirror lives beneath a single managed
//! base directory. These helpers compute the conventional checkout path,
//! the ordered candidates considered when a repository is deleted, and the
//! base-relative form used for confined filesystem access.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Directory under the base that holds cloned repositories.
pub const CLONED_SUBDIR: &str = "repos";

/// Directory under the base that holds locally created repositories.
pub const LOCAL_SUBDIR: &str = "local_repos";

/// Returns the conventional checkout path `base/name`.
///
/// Returns `None` when `name` is not a single normal path component.
#[must_use]
pub fn repository_local_path(base: &Utf8Path, name: &str) -> Option<Utf8PathBuf> {
    is_single_component(name).then(|| base.join(name))
}

/// Returns the ordered local directories considered on delete.
///
/// The stored path comes first, then `base/repos/<name>` and
/// `base/local_repos/<name>`. Duplicates are dropped.
#[must_use]
pub fn deletion_candidates(
    base: &Utf8Path,
    stored: Option<&Utf8Path>,
    name: &str,
) -> Vec<Utf8PathBuf> {
    let mut candidates: Vec<Utf8PathBuf> = stored.map(Utf8Path::to_path_buf).into_iter().collect();
    if is_single_component(name) {
        for subdir in [CLONED_SUBDIR, LOCAL_SUBDIR] {
            let candidate = base.join(subdir).join(name);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Returns `path` relative to `base` when it lies lexically inside it.
///
/// Paths with `..` components, paths equal to the base, and paths outside
/// the base yield `None`. Relative paths are interpreted relative to the
/// base.
#[must_use]
pub fn relative_to_base(base: &Utf8Path, path: &Utf8Path) -> Option<Utf8PathBuf> {
    let relative = if path.is_absolute() || (base.is_relative() && path.starts_with(base)) {
        path.strip_prefix(base).ok()?
    } else {
        path
    };
    let is_confined = relative
        .components()
        .all(|component| matches!(component, Utf8Component::Normal(_) | Utf8Component::CurDir));
    let has_normal = relative
        .components()
        .any(|component| matches!(component, Utf8Component::Normal(_)));
    (is_confined && has_normal).then(|| relative.to_path_buf())
}

fn is_single_component(name: &str) -> bool {
    let mut components = Utf8Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Utf8Component::Normal(_)), None)
    )
}
