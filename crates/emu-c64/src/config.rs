//! C64 configuration: video standard and JAM handling.

use emu_core::VideoStandard;
use mos_6510::JamPolicy;

/// Configuration for constructing a C64 instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct C64Config {
    /// PAL or NTSC. Sets the frame length and the TOD tenth period.
    pub video: VideoStandard,
    /// What the CPU does on a JAM opcode.
    pub jam_policy: JamPolicy,
}

impl C64Config {
    #[must_use]
    pub fn ntsc() -> Self {
        Self {
            video: VideoStandard::Ntsc,
            ..Self::default()
        }
    }
}
