//! Version information for `--version`, including the git hash of the build.

pub struct Version {
    pkg_version: &'static str,
    git_version: &'static str,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            pkg_version,
            git_version,
        } = self;
        write!(f, "{pkg_version} ({git_version})")
    }
}

// Lets clap display it as the version of a command.
impl From<Version> for clap::builder::Str {
    fn from(version: Version) -> Self {
        version.to_string().into()
    }
}

pub const VERSION: Version = Version {
    pkg_version: env!("CARGO_PKG_VERSION"),
    git_version: git_version::git_version!(
        args = ["--broken", "--always", "--exclude", "*"],
        prefix = "git:",
        fallback = "release"
    ),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_package_version() {
        let version = VERSION.to_string();
        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(version.ends_with(')'));
    }
}
