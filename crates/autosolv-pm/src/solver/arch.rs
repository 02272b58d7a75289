//! Architecture compatibility of the target system

/// Installable architectures of a base architecture, best first.
///
/// `noarch` packages are installable everywhere and never compared against
/// arch-specific packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchPolicy {
    basearch: String,
    compatible: Vec<String>,
}

impl ArchPolicy {
    pub fn new(basearch: &str) -> Self {
        let chain: &[&str] = match basearch {
            "x86_64" => &["x86_64", "athlon", "i686", "i586", "i486", "i386"],
            "i686" => &["i686", "i586", "i486", "i386"],
            "athlon" => &["athlon", "i686", "i586", "i486", "i386"],
            "aarch64" => &["aarch64"],
            "armv7hl" => &["armv7hl", "armv6hl"],
            "ppc64le" => &["ppc64le"],
            "ppc64" => &["ppc64", "ppc"],
            "s390x" => &["s390x", "s390"],
            other => {
                return Self {
                    basearch: other.to_string(),
                    compatible: vec![other.to_string()],
                }
            }
        };

        Self {
            basearch: basearch.to_string(),
            compatible: chain.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn basearch(&self) -> &str {
        &self.basearch
    }

    pub fn is_noarch(arch: &str) -> bool {
        arch == "noarch"
    }

    /// Whether packages of `arch` can be installed at all
    pub fn is_compatible(&self, arch: &str) -> bool {
        Self::is_noarch(arch) || self.compatible.iter().any(|a| a == arch)
    }

    /// Position in the compatibility chain, lower is better. `None` for
    /// `noarch` and incompatible architectures.
    pub fn score(&self, arch: &str) -> Option<usize> {
        self.compatible.iter().position(|a| a == arch)
    }

    /// Whether `a` is strictly preferred over `b`
    pub fn is_better(&self, a: &str, b: &str) -> bool {
        match (self.score(a), self.score(b)) {
            (Some(x), Some(y)) => x < y,
            _ => false,
        }
    }

    /// Every architecture name this policy knows, `noarch` included
    pub fn known(&self) -> impl Iterator<Item = &str> {
        self.compatible.iter().map(|a| a.as_str()).chain(std::iter::once("noarch"))
    }
}

impl Default for ArchPolicy {
    fn default() -> Self {
        Self::new("x86_64")
    }
}
