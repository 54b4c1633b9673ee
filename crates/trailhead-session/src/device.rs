//! Device identity: the phone the session claims to be.
//!
//! The server sees a device description with every signed request. It
//! should be stable per player, so it is derived from the session
//! [`Seed`] and nothing else: same seed, same device.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Seed;

/// A device description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// 32 lowercase hex characters.
    pub device_id: String,
    pub device_brand: String,
    pub device_model: String,
    /// Model identifier as reported at boot, e.g. `"iPhone8,1"`.
    pub device_model_boot: String,
    pub hardware_manufacturer: String,
    pub hardware_model: String,
    pub firmware_brand: String,
    pub firmware_type: String,
}

/// Builds the default device identity for a seed.
///
/// Implementations must be deterministic: the session builds the
/// identity once and caches it, but a restarted client with the same
/// seed has to come up with the same device.
///
/// Any `Fn(Seed) -> DeviceIdentity` closure is a builder, which keeps
/// tests short.
pub trait DeviceIdentityBuilder: Send + Sync + 'static {
    fn build_default(&self, seed: Seed) -> DeviceIdentity;
}

impl<F> DeviceIdentityBuilder for F
where
    F: Fn(Seed) -> DeviceIdentity + Send + Sync + 'static,
{
    fn build_default(&self, seed: Seed) -> DeviceIdentity {
        self(seed)
    }
}

/// (boot model, hardware model) pairs the default builder picks from.
const DEVICES: &[(&str, &str)] = &[
    ("iPhone5,1", "N41AP"),
    ("iPhone6,1", "N51AP"),
    ("iPhone7,1", "N56AP"),
    ("iPhone7,2", "N61AP"),
    ("iPhone8,1", "N71AP"),
    ("iPhone8,2", "N66AP"),
    ("iPhone8,4", "N69AP"),
    ("iPhone9,1", "D10AP"),
    ("iPhone9,2", "D11AP"),
];

const FIRMWARE_VERSIONS: &[&str] = &["9.3.3", "9.3.5", "10.0.2", "10.1.1"];

/// Picks an iPhone model and firmware from a seeded RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDeviceBuilder;

impl DeviceIdentityBuilder for DefaultDeviceBuilder {
    fn build_default(&self, seed: Seed) -> DeviceIdentity {
        // Reinterpret the signed seed's bits; negative seeds are fine.
        let mut rng = StdRng::seed_from_u64(seed.into_inner() as u64);

        let id_bytes: [u8; 16] = rng.random();
        let device_id = id_bytes.iter().map(|b| format!("{b:02x}")).collect();
        let (model_boot, hardware) = DEVICES[rng.random_range(0..DEVICES.len())];
        let firmware =
            FIRMWARE_VERSIONS[rng.random_range(0..FIRMWARE_VERSIONS.len())];

        DeviceIdentity {
            device_id,
            device_brand: "Apple".into(),
            device_model: "iPhone".into(),
            device_model_boot: model_boot.into(),
            hardware_manufacturer: "Apple".into(),
            hardware_model: hardware.into(),
            firmware_brand: "iPhone OS".into(),
            firmware_type: firmware.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder_same_seed_same_device() {
        let a = DefaultDeviceBuilder.build_default(Seed(12345));
        let b = DefaultDeviceBuilder.build_default(Seed(12345));
        assert_eq!(a, b);
    }

    #[test]
    fn test_default_builder_different_seeds_different_ids() {
        let a = DefaultDeviceBuilder.build_default(Seed(1));
        let b = DefaultDeviceBuilder.build_default(Seed(2));
        assert_ne!(a.device_id, b.device_id);
    }

    #[test]
    fn test_default_builder_produces_known_model() {
        let device = DefaultDeviceBuilder.build_default(Seed(-77));

        assert_eq!(device.device_id.len(), 32);
        assert!(
            DEVICES
                .iter()
                .any(|(boot, hw)| *boot == device.device_model_boot
                    && *hw == device.hardware_model)
        );
        assert!(FIRMWARE_VERSIONS.contains(&device.firmware_type.as_str()));
    }

    #[test]
    fn test_closure_is_a_builder() {
        let builder = |seed: Seed| DeviceIdentity {
            device_id: seed.to_string(),
            device_brand: String::new(),
            device_model: String::new(),
            device_model_boot: String::new(),
            hardware_manufacturer: String::new(),
            hardware_model: String::new(),
            firmware_brand: String::new(),
            firmware_type: String::new(),
        };
        assert_eq!(builder.build_default(Seed(9)).device_id, "9");
    }
}
