//! Device selection per frame
//!
//! Some platforms expose the same physical pad twice, once as a generic
//! device and once through a vendor layer (Steam Input being the common
//! case). Processing both would double every key stream, so when the
//! canonical device is present it wins and everything else is ignored.

use crate::controller::snapshot::DeviceSnapshot;
use tracing::debug;

/// Signature suffix of the Steam Input virtual gamepad
pub const STEAM_INPUT_SIGNATURE: &str = "(STANDARD GAMEPAD Vendor: 28de Product: 11ff)";

/// Picks the devices that are processed in this frame
///
/// Returns only the first device whose signature ends with `canonical`, or
/// every device when none matches. An empty `canonical` never matches.
pub fn select_devices<'a>(frame: &'a [DeviceSnapshot], canonical: &str) -> Vec<&'a DeviceSnapshot> {
    if !canonical.is_empty() {
        if let Some(device) = frame.iter().find(|d| d.signature.ends_with(canonical)) {
            debug!(
                "Canonical device {} present, ignoring {} other device(s)",
                device.index,
                frame.len() - 1
            );
            return vec![device];
        }
    }

    frame.iter().collect()
}
