//! Brew command encoding
//!
//! Every brew command has the same layout:
//! ```text
//! [ 03 05 07 04 ][ 00 00 00 00 ][ temperature ][ volume ]
//! ```
//!
//! Volumes and temperatures are looked up by the names the appliance's
//! presets use. Unknown names fall back to the default code instead of
//! failing.

/// Constant command header
pub const COMMAND_HEADER: [u8; 4] = [0x03, 0x05, 0x07, 0x04];

/// Total length of a brew command
pub const COMMAND_LEN: usize = 10;

const TEMPERATURE_OFFSET: usize = 8;
const VOLUME_OFFSET: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Temperature {
    /// "morno"
    Warm,
    /// "quente"
    #[default]
    Hot,
    /// "muito quente"
    VeryHot,
}

impl Temperature {
    const TABLE: [(&'static str, Temperature); 3] = [
        ("morno", Temperature::Warm),
        ("quente", Temperature::Hot),
        ("muito quente", Temperature::VeryHot),
    ];

    /// Look up a temperature by preset name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::TABLE
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, temperature)| *temperature)
    }

    /// Look up a temperature, falling back to the default
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            Temperature::Warm => "morno",
            Temperature::Hot => "quente",
            Temperature::VeryHot => "muito quente",
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Temperature::Hot => 0x00,
            Temperature::Warm => 0x01,
            Temperature::VeryHot => 0x02,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Volume {
    #[default]
    Ristretto,
    Espresso,
    Lungo,
    /// "agua quente"
    HotWater,
    Americano,
    /// "receita", the user-programmed recipe
    Recipe,
}

impl Volume {
    const TABLE: [(&'static str, Volume); 6] = [
        ("ristretto", Volume::Ristretto),
        ("espresso", Volume::Espresso),
        ("lungo", Volume::Lungo),
        ("agua quente", Volume::HotWater),
        ("americano", Volume::Americano),
        ("receita", Volume::Recipe),
    ];

    /// Look up a volume by preset name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::TABLE
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, volume)| *volume)
    }

    /// Look up a volume, falling back to the default
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }

    pub fn code(self) -> u8 {
        match self {
            Volume::Ristretto => 0x00,
            Volume::Espresso => 0x01,
            Volume::Lungo => 0x02,
            Volume::HotWater => 0x04,
            Volume::Americano => 0x05,
            Volume::Recipe => 0x07,
        }
    }
}

/// Encoded brew command, ready for the command characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandBuffer([u8; COMMAND_LEN]);

impl CommandBuffer {
    pub fn new(volume: Volume, temperature: Temperature) -> Self {
        let mut buf = [0u8; COMMAND_LEN];
        buf[..COMMAND_HEADER.len()].copy_from_slice(&COMMAND_HEADER);
        buf[TEMPERATURE_OFFSET] = temperature.code();
        buf[VOLUME_OFFSET] = volume.code();
        Self(buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Encode a brew command from preset names
pub fn encode(volume_name: &str, temperature_name: &str) -> CommandBuffer {
    CommandBuffer::new(Volume::resolve(volume_name), Temperature::resolve(temperature_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let cmd = encode("lungo", "muito quente");
        assert_eq!(
            cmd.as_bytes(),
            &[0x03, 0x05, 0x07, 0x04, 0x00, 0x00, 0x00, 0x00, 0x02, 0x02]
        );
    }

    #[test]
    fn test_known_tables() {
        let volumes = [
            ("ristretto", 0x00),
            ("espresso", 0x01),
            ("lungo", 0x02),
            ("agua quente", 0x04),
            ("americano", 0x05),
            ("receita", 0x07),
        ];
        let temperatures = [("morno", 0x01), ("quente", 0x00), ("muito quente", 0x02)];

        for (volume, volume_code) in volumes {
            for (temperature, temperature_code) in temperatures {
                let cmd = encode(volume, temperature);
                assert_eq!(cmd.as_bytes().len(), COMMAND_LEN);
                assert_eq!(&cmd.as_bytes()[..4], &COMMAND_HEADER);
                assert_eq!(cmd.as_bytes()[TEMPERATURE_OFFSET], temperature_code);
                assert_eq!(cmd.as_bytes()[VOLUME_OFFSET], volume_code);
                assert_eq!(cmd, encode(volume, temperature));
            }
        }
    }

    #[test]
    fn test_unknown_names_fall_back() {
        let cmd = encode("cappuccino", "scalding");
        assert_eq!(cmd.as_bytes()[TEMPERATURE_OFFSET], 0x00);
        assert_eq!(cmd.as_bytes()[VOLUME_OFFSET], 0x00);
        assert_eq!(encode("", ""), cmd);
    }

    #[test]
    fn test_names_case_insensitive() {
        assert_eq!(Volume::from_name("Espresso"), Some(Volume::Espresso));
        assert_eq!(Temperature::from_name(" MUITO QUENTE "), Some(Temperature::VeryHot));
        assert_eq!(Temperature::resolve(Temperature::VeryHot.name()), Temperature::VeryHot);
    }
}
