use anyhow::{bail, Context, Result};
use flirc_keys::ReportSource;
use rusb::{DeviceHandle, GlobalContext};
use std::time::Duration;
use tracing::{debug, info};

/// Flirc USB vendor id.
pub const FLIRC_VID: u16 = 0x20A0;

/// HID interface class code.
const HID_CLASS: u8 = 3;

/// Keyboard report endpoints carry 8-byte packets.
const REPORT_PACKET_SIZE: u16 = 8;

/// Detect whether a receiver with `vendor_id` is connected.
pub fn detect(vendor_id: u16) -> Result<Option<u16>> {
    let devices = rusb::devices().context("failed to enumerate USB devices")?;
    for device in devices.iter() {
        let desc = device
            .device_descriptor()
            .context("failed to read device descriptor")?;
        if desc.vendor_id() == vendor_id {
            return Ok(Some(desc.product_id()));
        }
    }
    Ok(None)
}

/// An open receiver with its keyboard interface claimed.
pub struct Receiver {
    handle: DeviceHandle<GlobalContext>,
    interface: u8,
    endpoint: u8,
    timeout: Duration,
    reattach_kernel_driver: bool,
}

impl Receiver {
    /// Open the first receiver with `vendor_id` and claim its keyboard interface.
    ///
    /// `timeout` bounds every read so the poll loop can observe shutdown.
    pub fn open(vendor_id: u16, timeout: Duration) -> Result<Self> {
        let devices = rusb::devices().context("failed to enumerate USB devices")?;
        for device in devices.iter() {
            let desc = device
                .device_descriptor()
                .context("failed to read device descriptor")?;
            if desc.vendor_id() != vendor_id {
                continue;
            }

            let (interface, endpoint) = find_report_endpoint(&device)?;
            let handle = device.open().context(
                "failed to open receiver (may need root/sudo or udev rules)",
            )?;

            let reattach_kernel_driver = match handle.kernel_driver_active(interface) {
                Ok(true) => {
                    handle
                        .detach_kernel_driver(interface)
                        .context("failed to detach kernel HID driver")?;
                    true
                }
                Ok(false) | Err(rusb::Error::NotSupported) => false,
                Err(e) => return Err(e).context("failed to query kernel driver"),
            };

            handle
                .claim_interface(interface)
                .with_context(|| format!("failed to claim interface {}", interface))?;

            info!(
                "Connected receiver {:04X}:{:04X} interface #{} endpoint 0x{:02X}",
                vendor_id,
                desc.product_id(),
                interface,
                endpoint
            );

            return Ok(Self {
                handle,
                interface,
                endpoint,
                timeout,
                reattach_kernel_driver,
            });
        }
        bail!("receiver {:04X} not found", vendor_id);
    }
}

/// Find the HID interface whose first endpoint carries 8-byte reports.
fn find_report_endpoint(device: &rusb::Device<GlobalContext>) -> Result<(u8, u8)> {
    let config = device
        .config_descriptor(0)
        .context("failed to read configuration descriptor")?;

    for interface in config.interfaces() {
        for alt in interface.descriptors() {
            if alt.class_code() != HID_CLASS {
                continue;
            }
            if let Some(endpoint) = alt.endpoint_descriptors().next() {
                if endpoint.max_packet_size() == REPORT_PACKET_SIZE {
                    return Ok((alt.interface_number(), endpoint.address()));
                }
            }
        }
    }
    bail!("cannot find a keyboard report interface");
}

impl ReportSource for Receiver {
    type Error = rusb::Error;

    fn read_report(&mut self, buf: &mut [u8]) -> Result<Option<usize>, rusb::Error> {
        match self.handle.read_interrupt(self.endpoint, buf, self.timeout) {
            Ok(len) => Ok(Some(len)),
            Err(rusb::Error::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        // The device may already be gone; nothing useful to do with errors here.
        let _ = self.handle.release_interface(self.interface);
        if self.reattach_kernel_driver {
            let _ = self.handle.attach_kernel_driver(self.interface);
        }
        debug!("Released interface #{}", self.interface);
    }
}
