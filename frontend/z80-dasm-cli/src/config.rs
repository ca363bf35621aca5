use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use z80_dasm::{Architecture, ListingOptions};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisassemblerConfig {
    #[serde(default)]
    pub architecture: Architecture,
    #[serde(default)]
    pub origin: u16,
    #[serde(default)]
    pub listing: ListingOptions,
}

impl DisassemblerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file '{}'", path.display()))?;
        let config = toml::from_str(&config_str)
            .with_context(|| format!("Unable to parse config file '{}'", path.display()))?;

        log::debug!("Loaded config from '{}': {config:?}", path.display());

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use z80_dasm::ListingStyle;

    #[test]
    fn empty_config_is_default() {
        let config: DisassemblerConfig = toml::from_str("").unwrap();
        assert_eq!(config, DisassemblerConfig::default());
        assert_eq!(config.architecture, Architecture::Z80);
        assert_eq!(config.origin, 0);
        assert!(config.listing.comments);
        assert!(config.listing.references);
    }

    #[test]
    fn full_config() {
        let config: DisassemblerConfig = toml::from_str(
            r#"
            architecture = "I8085"
            origin = 256

            [listing]
            style = "Source"
            comments = false
            references = true
            "#,
        )
        .unwrap();

        assert_eq!(config.architecture, Architecture::I8085);
        assert_eq!(config.origin, 0x0100);
        assert_eq!(
            config.listing,
            ListingOptions { style: ListingStyle::Source, comments: false, references: true }
        );
    }

    #[test]
    fn partial_listing_table() {
        let config: DisassemblerConfig = toml::from_str(
            r#"
            architecture = "8080"

            [listing]
            references = false
            "#,
        )
        .unwrap();

        assert_eq!(config.architecture, Architecture::I8080);
        assert_eq!(config.listing.style, ListingStyle::Listing);
        assert!(config.listing.comments);
        assert!(!config.listing.references);
    }

    #[test]
    fn origin_must_fit_in_16_bits() {
        assert!(toml::from_str::<DisassemblerConfig>("origin = 65536").is_err());
    }

    #[test]
    fn round_trip_through_toml() {
        let config = DisassemblerConfig {
            architecture: Architecture::I8080,
            origin: 0xC000,
            listing: ListingOptions { style: ListingStyle::Source, ..ListingOptions::default() },
        };
        let serialized = toml::to_string(&config).unwrap();
        assert_eq!(toml::from_str::<DisassemblerConfig>(&serialized).unwrap(), config);
    }
}
