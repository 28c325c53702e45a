//! Trigger kinds for a VM execution.

/// The mode under which a VM execution was invoked.
///
/// Verification triggers run read-only signature checks; application
/// triggers may mutate state. The `R` variants mark system-level runs
/// of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TriggerType {
    Verification = 0x00,
    VerificationR = 0x01,
    Application = 0x10,
    ApplicationR = 0x11,
}

impl TriggerType {
    /// True for triggers allowed to mutate ledger state.
    pub fn is_application(self) -> bool {
        matches!(self, Self::Application | Self::ApplicationR)
    }

    /// True for the read-only signature-check triggers.
    pub fn is_verification(self) -> bool {
        matches!(self, Self::Verification | Self::VerificationR)
    }

    /// Decodes the wire byte, if it names a known trigger.
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Verification),
            0x01 => Some(Self::VerificationR),
            0x10 => Some(Self::Application),
            0x11 => Some(Self::ApplicationR),
            _ => None,
        }
    }
}
