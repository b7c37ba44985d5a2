//! Source path trimming for trace frames.

use std::env;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Environment variable pointing at the toolchain's standard library sources.
pub const TOOLCHAIN_ROOT_ENV: &str = "RUST_SRC_ROOT";

/// Environment variable listing additional source roots, separated the same
/// way as `PATH`.
pub const SEARCH_ROOTS_ENV: &str = "STOWAGE_TRACE_ROOTS";

/// Where std sources live in a release toolchain's debug info.
const DEFAULT_TOOLCHAIN_ROOT: &str = "/rustc";

/// Directory name the project is checked out under. Trimmed last so nested
/// checkouts below a search root still come out workspace-relative.
pub const SELF_PATH: &str = "stowage";

/// Strips well-known root directories off source file paths so traces show
/// project-relative locations.
#[derive(Debug, Clone, Default)]
pub struct PathTrimmer {
    prefixes: Vec<String>,
}

impl PathTrimmer {
    /// Prefixes are applied in this order: toolchain root, each search root,
    /// then `self_root`.
    pub fn new<I, P>(
        toolchain_root: impl AsRef<Path>,
        search_roots: I,
        self_root: impl AsRef<Path>,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut prefixes = vec![as_prefix(toolchain_root.as_ref())];
        prefixes.extend(
            search_roots
                .into_iter()
                .filter(|root| !root.as_ref().as_os_str().is_empty())
                .map(|root| as_prefix(root.as_ref())),
        );
        prefixes.push(as_prefix(self_root.as_ref()));
        Self { prefixes }
    }

    /// Build the prefix set from the environment. The workspace this crate was
    /// built in is always searched after the configured roots.
    pub fn from_env() -> Self {
        let toolchain_root = env::var_os(TOOLCHAIN_ROOT_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOOLCHAIN_ROOT));
        let mut search_roots: Vec<PathBuf> = env::var_os(SEARCH_ROOTS_ENV)
            .map(|list| env::split_paths(&list).collect())
            .unwrap_or_default();
        search_roots.push(workspace_root());

        let trimmer = Self::new(toolchain_root, search_roots, SELF_PATH);
        tracing::debug!(prefixes = ?trimmer.prefixes, "trace path prefixes");
        trimmer
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Trim every known prefix, in order, from `file`.
    ///
    /// The self path is only trimmed once a root has matched, so a path that
    /// is already project-relative comes back unchanged.
    pub fn trim(&self, file: &str) -> String {
        let Some((self_prefix, roots)) = self.prefixes.split_last() else {
            return file.to_string();
        };

        let mut trimmed = to_slash(file);
        let mut matched_root = false;
        for prefix in roots {
            if let Some(rest) = trimmed.strip_prefix(to_slash(prefix).as_str()) {
                trimmed = rest.to_string();
                matched_root = true;
            }
        }
        if matched_root {
            if let Some(rest) = trimmed.strip_prefix(to_slash(self_prefix).as_str()) {
                trimmed = rest.to_string();
            }
        }
        from_slash(&trimmed)
    }
}

/// Root of the workspace this crate was built in.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

fn as_prefix(root: &Path) -> String {
    let mut prefix = root.to_string_lossy().into_owned();
    if !prefix.ends_with(MAIN_SEPARATOR) {
        prefix.push(MAIN_SEPARATOR);
    }
    prefix
}

fn to_slash(path: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace(MAIN_SEPARATOR, "/")
    }
}

fn from_slash(path: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace('/', &MAIN_SEPARATOR.to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn trimmer() -> PathTrimmer {
        PathTrimmer::new("/rustc/90b35a6", ["/home/dev/src", "/opt/vendor"], SELF_PATH)
    }

    #[test]
    fn test_prefix_order() {
        assert_eq!(
            trimmer().prefixes(),
            &[
                "/rustc/90b35a6/".to_string(),
                "/home/dev/src/".to_string(),
                "/opt/vendor/".to_string(),
                "stowage/".to_string(),
            ]
        );
    }

    #[test]
    fn test_trims_toolchain_root() {
        assert_eq!(
            trimmer().trim("/rustc/90b35a6/library/std/src/rt.rs"),
            "library/std/src/rt.rs"
        );
    }

    #[test]
    fn test_trims_search_root() {
        assert_eq!(
            trimmer().trim("/opt/vendor/serde-1.0.200/src/de/mod.rs"),
            "serde-1.0.200/src/de/mod.rs"
        );
    }

    #[test]
    fn test_self_path_trims_after_search_root() {
        assert_eq!(
            trimmer().trim("/home/dev/src/stowage/crates/stowage/src/main.rs"),
            "crates/stowage/src/main.rs"
        );
    }

    #[test]
    fn test_workspace_search_root() {
        let trimmer = PathTrimmer::new("/rustc/x", ["/build/checkout"], SELF_PATH);
        assert_eq!(
            trimmer.trim("/build/checkout/crates/stowage/src/main.rs"),
            "crates/stowage/src/main.rs"
        );
    }

    #[test]
    fn test_unmatched_path_passes_through() {
        assert_eq!(trimmer().trim("/usr/src/other/lib.rs"), "/usr/src/other/lib.rs");
        assert_eq!(trimmer().trim("src/main.rs"), "src/main.rs");
    }

    #[test]
    fn test_trimming_is_idempotent() {
        let trimmer = trimmer();
        let once = trimmer.trim("/home/dev/src/stowage/crates/stowage/src/store.rs");
        assert_eq!(once, "crates/stowage/src/store.rs");
        assert_eq!(trimmer.trim(&once), once);
    }

    #[test]
    fn test_relative_path_under_self_name_is_left_alone() {
        let trimmer = PathTrimmer::new("/rustc", ["/src"], SELF_PATH);
        assert_eq!(trimmer.trim("stowage/lib.rs"), "stowage/lib.rs");

        let once = trimmer.trim("/src/stowage/stowage/lib.rs");
        assert_eq!(once, "stowage/lib.rs");
        assert_eq!(trimmer.trim(&once), once);
    }

    #[test]
    fn test_default_trimmer_passes_everything_through() {
        let trimmer = PathTrimmer::default();
        assert_eq!(trimmer.trim("/abs/lib.rs"), "/abs/lib.rs");
    }

    #[test]
    fn test_empty_search_roots_are_ignored() {
        let trimmer = PathTrimmer::new("/rustc", ["", "/srv"], SELF_PATH);
        assert_eq!(trimmer.prefixes().len(), 3);
    }

    #[test]
    fn test_workspace_root_contains_crates() {
        assert!(workspace_root().join("crates").is_dir());
    }
}
