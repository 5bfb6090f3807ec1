//! Raw logger columns and the physical channels they carry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "P_N2_Tank")]
    PN2Tank,
    #[serde(rename = "P_Chamber")]
    PChamber,
    #[serde(rename = "P_Fuel_Tank")]
    PFuelTank,
    #[serde(rename = "Rocket_Mass")]
    RocketMass,
    #[serde(rename = "Thrust")]
    Thrust,
    #[serde(rename = "P_Fuel_Inlet")]
    PFuelInlet,
    #[serde(rename = "P_Ox_Tank")]
    POxTank,
    #[serde(rename = "P_Fuel_Injector")]
    PFuelInjector,
    #[serde(rename = "TC1")]
    Tc1,
    #[serde(rename = "TC2")]
    Tc2,
    #[serde(rename = "Fuel_Flow_Rate")]
    FuelFlowRate,
    #[serde(rename = "TC3")]
    Tc3,
    #[serde(rename = "Time")]
    Time,
}

impl Channel {
    pub const ALL: [Channel; 13] = [
        Self::PN2Tank,
        Self::PChamber,
        Self::PFuelTank,
        Self::RocketMass,
        Self::Thrust,
        Self::PFuelInlet,
        Self::POxTank,
        Self::PFuelInjector,
        Self::Tc1,
        Self::Tc2,
        Self::FuelFlowRate,
        Self::Tc3,
        Self::Time,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::PN2Tank => "P_N2_Tank",
            Self::PChamber => "P_Chamber",
            Self::PFuelTank => "P_Fuel_Tank",
            Self::RocketMass => "Rocket_Mass",
            Self::Thrust => "Thrust",
            Self::PFuelInlet => "P_Fuel_Inlet",
            Self::POxTank => "P_Ox_Tank",
            Self::PFuelInjector => "P_Fuel_Injector",
            Self::Tc1 => "TC1",
            Self::Tc2 => "TC2",
            Self::FuelFlowRate => "Fuel_Flow_Rate",
            Self::Tc3 => "TC3",
            Self::Time => "Time",
        }
    }

    /// Column id written by the test-stand backend.
    pub fn default_raw_id(self) -> &'static str {
        match self {
            Self::PN2Tank => "ch0sens",
            Self::PChamber => "ch2sens",
            Self::PFuelTank => "ch3sens",
            Self::RocketMass => "ch6sens",
            Self::Thrust => "ch7sens",
            Self::PFuelInlet => "ch8sens",
            Self::POxTank => "ch9sens",
            Self::PFuelInjector => "ch10sens",
            Self::Tc1 => "temp0",
            Self::Tc2 => "temp1",
            Self::FuelFlowRate => "temp2",
            Self::Tc3 => "temp3",
            Self::Time => "system_time",
        }
    }

    /// Thermocouples are logged but nothing downstream reads them.
    pub fn is_required(self) -> bool {
        !matches!(self, Self::Tc1 | Self::Tc2 | Self::Tc3)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Physical channel -> raw column id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMap {
    entries: BTreeMap<Channel, String>,
}

impl Default for ChannelMap {
    fn default() -> Self {
        let entries = Channel::ALL
            .iter()
            .map(|c| (*c, c.default_raw_id().to_string()))
            .collect();
        Self { entries }
    }
}

impl ChannelMap {
    /// Default map with some raw ids replaced.
    pub fn with_overrides(overrides: &BTreeMap<Channel, String>) -> Self {
        let mut map = Self::default();
        for (channel, raw) in overrides {
            map.entries.insert(*channel, raw.clone());
        }
        map
    }

    pub fn raw_id(&self, channel: Channel) -> &str {
        self.entries
            .get(&channel)
            .map(String::as_str)
            .unwrap_or_else(|| channel.default_raw_id())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &str)> {
        self.entries.iter().map(|(c, r)| (*c, r.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map() {
        let map = ChannelMap::default();
        assert_eq!(map.raw_id(Channel::Thrust), "ch7sens");
        assert_eq!(map.raw_id(Channel::FuelFlowRate), "temp2");
        assert_eq!(map.raw_id(Channel::Time), "system_time");
        assert_eq!(map.iter().count(), 13);
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert(Channel::Thrust, "ch12sens".to_string());
        let map = ChannelMap::with_overrides(&overrides);
        assert_eq!(map.raw_id(Channel::Thrust), "ch12sens");
        assert_eq!(map.raw_id(Channel::RocketMass), "ch6sens");
    }

    #[test]
    fn test_names_round_trip_through_serde() {
        for c in Channel::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.name()));
        }
        assert!(!Channel::Tc2.is_required());
        assert!(Channel::Thrust.is_required());
    }
}
