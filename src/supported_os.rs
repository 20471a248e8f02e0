use std::fmt;

/// Operating systems an artifact definition or source can be restricted to.
///
/// An empty list of supported operating systems means "unrestricted".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SupportedOs {
    /// Apple macOS
    Darwin,
    /// Linux distributions
    Linux,
    /// Microsoft Windows
    Windows,
}

impl SupportedOs {
    pub const ALL: [SupportedOs; 3] = [SupportedOs::Darwin, SupportedOs::Linux, SupportedOs::Windows];

    /// Look up an operating system by its exact (case-sensitive) name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Darwin" => Some(SupportedOs::Darwin),
            "Linux" => Some(SupportedOs::Linux),
            "Windows" => Some(SupportedOs::Windows),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedOs::Darwin => "Darwin",
            SupportedOs::Linux => "Linux",
            SupportedOs::Windows => "Windows",
        }
    }
}

impl fmt::Display for SupportedOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
