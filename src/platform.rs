//! Target calculator models and their device parameters.
use std::fmt;

/// A calculator model the SDK knows device parameters for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    /// TI-73.
    Ti73,
    /// TI-83 Plus.
    Ti83p,
    /// TI-83 Plus Silver Edition.
    Ti83pSe,
    /// TI-84 Plus.
    Ti84p,
    /// TI-84 Plus Silver Edition.
    Ti84pSe,
    /// TI-84 Plus C Silver Edition.
    Ti84pCse,
}

impl Device {
    /// Every known model, in table order.
    pub const ALL: [Self; 6] = [
        Self::Ti73,
        Self::Ti83p,
        Self::Ti83pSe,
        Self::Ti84p,
        Self::Ti84pSe,
        Self::Ti84pCse,
    ];

    /// Resolve a platform string such as `TI84pSE`, `84pse` or `ti73`.
    ///
    /// Matching is case-insensitive and the `TI` prefix is optional.
    #[must_use]
    pub fn lookup(platform: &str) -> Option<Self> {
        let wanted = platform.trim().to_ascii_lowercase();
        let wanted = wanted.strip_prefix("ti").unwrap_or(&wanted);
        Self::ALL
            .into_iter()
            .find(|d| d.name().get(2..).is_some_and(|n| n.eq_ignore_ascii_case(wanted)))
    }

    /// Canonical platform name used in kernel asset names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ti73 => "TI73",
            Self::Ti83p => "TI83p",
            Self::Ti83pSe => "TI83pSE",
            Self::Ti84p => "TI84p",
            Self::Ti84pSe => "TI84pSE",
            Self::Ti84pCse => "TI84pCSE",
        }
    }

    /// Signing key identifier.
    #[must_use]
    pub const fn key(self) -> u8 {
        match self {
            Self::Ti73 => 0x02,
            Self::Ti83p | Self::Ti83pSe => 0x04,
            Self::Ti84p | Self::Ti84pSe => 0x0A,
            Self::Ti84pCse => 0x0F,
        }
    }

    /// First flash page of the filesystem table.
    #[must_use]
    pub const fn fat(self) -> u8 {
        match self {
            Self::Ti73 | Self::Ti83p => 0x17,
            Self::Ti83pSe | Self::Ti84pSe => 0x77,
            Self::Ti84p => 0x37,
            Self::Ti84pCse => 0xF7,
        }
    }

    /// Privileged flash page.
    #[must_use]
    pub const fn privileged(self) -> u8 {
        match self {
            Self::Ti73 | Self::Ti83p => 0x1C,
            Self::Ti83pSe | Self::Ti84pSe => 0x7C,
            Self::Ti84p => 0x3C,
            Self::Ti84pCse => 0xFC,
        }
    }

    /// Extension of OS upgrade files for this model.
    #[must_use]
    pub const fn upgrade_ext(self) -> &'static str {
        match self {
            Self::Ti73 => "73u",
            Self::Ti84pCse => "8cu",
            _ => "8xu",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
