//! Operating system type hierarchy.
//!
//! A requirement written against a base type (for example `Linux`) is satisfied by
//! every descendant (`Ubuntu`, `CentOs`, ...), so matching always runs over a
//! candidate's full ancestor chain.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OsType {
    OperatingSystem,
    Windows,
    Posix,
    Bsd,
    FreeBsd,
    OpenBsd,
    Linux,
    Debian,
    Ubuntu,
    Fedora,
    Redhat,
    CentOs,
    Oracle,
    CoreOs,
    Suse,
    NixOs,
    OtherLinux,
}

const ALL: [OsType; 17] = [
    OsType::OperatingSystem,
    OsType::Windows,
    OsType::Posix,
    OsType::Bsd,
    OsType::FreeBsd,
    OsType::OpenBsd,
    OsType::Linux,
    OsType::Debian,
    OsType::Ubuntu,
    OsType::Fedora,
    OsType::Redhat,
    OsType::CentOs,
    OsType::Oracle,
    OsType::CoreOs,
    OsType::Suse,
    OsType::NixOs,
    OsType::OtherLinux,
];

// Most specific first: a derived distro must win over its base.
const DETECT_PATTERNS: &[(OsType, &str)] = &[
    (OsType::Ubuntu, r"^(Ubuntu|ubuntu)$"),
    (OsType::Debian, r"^(debian|Debian|Forcepoint|Kali)$"),
    (OsType::CentOs, r"^(CentOS|Centos|centos|clear-linux-os)$"),
    (OsType::CoreOs, r"^(coreos|Flatcar|flatcar)$"),
    (OsType::Oracle, r"^(Oracle|ol)$"),
    (OsType::Redhat, r"^(rhel|Red|Scientific|acronis|Actifio)$"),
    (OsType::Fedora, r"^(Fedora|fedora)$"),
    (
        OsType::Suse,
        r"^(SLES|SUSE|sles|sle-hpc|sle_hpc|opensuse-leap)$",
    ),
    (OsType::NixOs, r"^(NixOS|nixos)$"),
    (OsType::FreeBsd, r"^FreeBSD$"),
    (OsType::OpenBsd, r"^OpenBSD$"),
    (
        OsType::OtherLinux,
        r"^(Sapphire|Buildroot|OpenWrt|BloombaseOS|FMOS|idms|RecoveryOS|sinefa)$",
    ),
];

#[derive(Debug, Clone)]
pub struct OsTypeParseError {
    value: String,
}

impl fmt::Display for OsTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid os type {:?}", self.value)
    }
}

impl std::error::Error for OsTypeParseError {}

impl OsType {
    pub fn all() -> &'static [OsType] {
        &ALL
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OsType::OperatingSystem => "operating-system",
            OsType::Windows => "windows",
            OsType::Posix => "posix",
            OsType::Bsd => "bsd",
            OsType::FreeBsd => "freebsd",
            OsType::OpenBsd => "openbsd",
            OsType::Linux => "linux",
            OsType::Debian => "debian",
            OsType::Ubuntu => "ubuntu",
            OsType::Fedora => "fedora",
            OsType::Redhat => "redhat",
            OsType::CentOs => "centos",
            OsType::Oracle => "oracle",
            OsType::CoreOs => "coreos",
            OsType::Suse => "suse",
            OsType::NixOs => "nixos",
            OsType::OtherLinux => "other-linux",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Direct base type; `None` only for the root.
    pub fn parent(self) -> Option<Self> {
        match self {
            OsType::OperatingSystem => None,
            OsType::Windows | OsType::Posix => Some(OsType::OperatingSystem),
            OsType::Bsd | OsType::Linux => Some(OsType::Posix),
            OsType::FreeBsd | OsType::OpenBsd => Some(OsType::Bsd),
            OsType::Debian
            | OsType::Fedora
            | OsType::Suse
            | OsType::NixOs
            | OsType::OtherLinux => Some(OsType::Linux),
            OsType::Ubuntu => Some(OsType::Debian),
            OsType::Redhat => Some(OsType::Fedora),
            OsType::CentOs | OsType::Oracle | OsType::CoreOs => Some(OsType::Redhat),
        }
    }

    /// `self` followed by every base type up to the root.
    pub fn ancestors(self) -> Vec<OsType> {
        let mut out = vec![self];
        let mut cur = self;
        while let Some(parent) = cur.parent() {
            out.push(parent);
            cur = parent;
        }
        out
    }

    pub fn is_a(self, base: OsType) -> bool {
        self.ancestors().contains(&base)
    }

    pub fn is_posix(self) -> bool {
        self.is_a(OsType::Posix)
    }

    pub fn is_windows(self) -> bool {
        self.is_a(OsType::Windows)
    }

    /// Maps one release string (an `os-release` `ID`/`NAME`, `lsb_release`
    /// description, `uname` output, ...) to the most specific known type.
    pub fn detect(info: &str) -> Option<Self> {
        let info = info.trim();
        if info.is_empty() {
            return None;
        }
        detect_table()
            .iter()
            .find(|(_, re)| re.is_match(info))
            .map(|(t, _)| *t)
    }
}

fn detect_table() -> &'static [(OsType, Regex)] {
    static TABLE: OnceLock<Vec<(OsType, Regex)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        DETECT_PATTERNS
            .iter()
            .filter_map(|(t, p)| Regex::new(p).ok().map(|re| (*t, re)))
            .collect()
    })
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsType {
    type Err = OsTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OsType::parse(&s.to_ascii_lowercase()).ok_or_else(|| OsTypeParseError {
            value: s.to_string(),
        })
    }
}

#[cfg(feature = "clap")]
impl clap::ValueEnum for OsType {
    fn value_variants<'a>() -> &'a [Self] {
        &ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ubuntu_chain_reaches_root() {
        assert_eq!(
            OsType::Ubuntu.ancestors(),
            vec![
                OsType::Ubuntu,
                OsType::Debian,
                OsType::Linux,
                OsType::Posix,
                OsType::OperatingSystem
            ]
        );
        assert!(OsType::Ubuntu.is_a(OsType::Linux));
        assert!(!OsType::Ubuntu.is_a(OsType::Windows));
        assert!(OsType::CentOs.is_a(OsType::Fedora));
        assert!(OsType::FreeBsd.is_posix());
        assert!(OsType::Windows.is_windows());
    }

    #[test]
    fn every_type_parses_back() {
        for &t in OsType::all() {
            assert_eq!(OsType::parse(t.as_str()), Some(t));
            assert_eq!(t.as_str().parse::<OsType>().ok(), Some(t));
        }
        assert!("plan9".parse::<OsType>().is_err());
    }

    #[test]
    fn detect_prefers_specific_distro() {
        assert_eq!(OsType::detect("ubuntu"), Some(OsType::Ubuntu));
        assert_eq!(OsType::detect("Debian"), Some(OsType::Debian));
        assert_eq!(OsType::detect("centos"), Some(OsType::CentOs));
        assert_eq!(OsType::detect("rhel"), Some(OsType::Redhat));
        assert_eq!(OsType::detect("flatcar"), Some(OsType::CoreOs));
        assert_eq!(OsType::detect("sles"), Some(OsType::Suse));
        assert_eq!(OsType::detect("FreeBSD"), Some(OsType::FreeBsd));
        assert_eq!(OsType::detect("OpenWrt"), Some(OsType::OtherLinux));
        assert_eq!(OsType::detect(""), None);
        assert_eq!(OsType::detect("Haiku"), None);
    }
}
