//! Maps `Box<dyn Error>` from trait boundaries to typed `PlayerError`.
//!
//! The traits in `player_traits` use `Box<dyn Error + Send + Sync>` so any
//! backend can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `player_hardware::HwError`.

use crate::error::PlayerError;

/// Map a trait-boundary error to a typed `PlayerError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> PlayerError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<player_hardware::error::HwError>() {
            return match hw {
                player_hardware::error::HwError::Gpio(msg) => {
                    PlayerError::HardwareFault(format!("gpio: {msg}"))
                }
                player_hardware::error::HwError::UnknownPin(pin) => {
                    PlayerError::Config(format!("pin {pin} is not wired"))
                }
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("gpio") {
        PlayerError::HardwareFault(s)
    } else {
        PlayerError::Hardware(s)
    }
}
