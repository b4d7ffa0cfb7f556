use core::fmt;
use serde::{Deserialize, Serialize};

use crate::{ControlError, Result};

/// Seconds a time freeze adds to the running countdown.
pub const TIME_FREEZE_SECONDS: u32 = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpId {
    TimeFreeze,
    Debugger,
    Skip,
}

impl PowerUpId {
    pub const ALL: [PowerUpId; 3] = [Self::TimeFreeze, Self::Debugger, Self::Skip];

    /// Price in bytes, as charged by the shop.
    pub const fn price(self) -> u64 {
        match self {
            Self::TimeFreeze => 50,
            Self::Debugger => 75,
            Self::Skip => 100,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::TimeFreeze => "Time Freeze",
            Self::Debugger => "Debugger",
            Self::Skip => "Skip",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::TimeFreeze => "+10 seconds on the clock",
            Self::Debugger => "Reveals one character of the answer",
            Self::Skip => "Skip the current sequence",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::TimeFreeze => "⏱️",
            Self::Debugger => "🔍",
            Self::Skip => "⏭️",
        }
    }
}

impl fmt::Display for PowerUpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Owned power-up counts, in the shape the shop endpoints use.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUps {
    pub time_freeze: u32,
    pub debugger: u32,
    pub skip: u32,
}

impl PowerUps {
    pub const fn count(&self, id: PowerUpId) -> u32 {
        match id {
            PowerUpId::TimeFreeze => self.time_freeze,
            PowerUpId::Debugger => self.debugger,
            PowerUpId::Skip => self.skip,
        }
    }

    fn count_mut(&mut self, id: PowerUpId) -> &mut u32 {
        match id {
            PowerUpId::TimeFreeze => &mut self.time_freeze,
            PowerUpId::Debugger => &mut self.debugger,
            PowerUpId::Skip => &mut self.skip,
        }
    }
}

/// Local mirror of the shop ledger; the service copy is authoritative.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopState {
    pub bytes: u64,
    pub power_ups: PowerUps,
}

impl ShopState {
    pub const fn count(&self, id: PowerUpId) -> u32 {
        self.power_ups.count(id)
    }

    pub const fn can_afford(&self, id: PowerUpId) -> bool {
        self.bytes >= id.price()
    }

    /// Uses up one power-up, returning how many are left.
    pub fn consume(&mut self, id: PowerUpId) -> Result<u32> {
        let count = self.power_ups.count_mut(id);
        if *count == 0 {
            return Err(ControlError::PowerUpUnavailable(id));
        }
        *count -= 1;
        Ok(*count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_never_goes_negative() {
        let mut shop = ShopState {
            bytes: 0,
            power_ups: PowerUps {
                skip: 1,
                ..Default::default()
            },
        };

        assert_eq!(shop.consume(PowerUpId::Skip), Ok(0));
        assert_eq!(
            shop.consume(PowerUpId::Skip),
            Err(ControlError::PowerUpUnavailable(PowerUpId::Skip))
        );
        assert_eq!(shop.count(PowerUpId::Skip), 0);
    }

    #[test]
    fn affordability_follows_price_list() {
        let shop = ShopState {
            bytes: 75,
            power_ups: PowerUps::default(),
        };

        assert!(shop.can_afford(PowerUpId::TimeFreeze));
        assert!(shop.can_afford(PowerUpId::Debugger));
        assert!(!shop.can_afford(PowerUpId::Skip));
    }
}
