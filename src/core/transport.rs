//! USB delivery of status frames.
//!
//! The device handle is opened, configured and released inside every
//! [`UsbDisplay::send`] call. Nothing is held between cycles, so a replugged
//! display is picked up on the next frame without extra bookkeeping.

use rusb::{Context, DeviceHandle, Direction, TransferType, UsbContext};
use std::time::Duration;

use super::frame::Frame;
use crate::error::{Result, TransportError};

pub const DISPLAY_VENDOR_ID: u16 = 0x2022;
pub const DISPLAY_PRODUCT_ID: u16 = 0x0522;

/// Anything that can take a frame off the monitoring loop's hands.
///
/// Implementations report expected delivery faults as
/// [`FluxError::Transport`](crate::error::FluxError::Transport); any other
/// error is treated as an unexpected cycle failure.
pub trait FrameSink {
    fn send(&mut self, frame: &Frame) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbSettings {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Upper bound for the OUT transfer
    pub timeout: Duration,
}

impl Default for UsbSettings {
    fn default() -> Self {
        Self {
            vendor_id: DISPLAY_VENDOR_ID,
            product_id: DISPLAY_PRODUCT_ID,
            timeout: Duration::from_secs(1),
        }
    }
}

/// The FLUX Pro display on the USB bus.
pub struct UsbDisplay {
    context: Context,
    settings: UsbSettings,
}

impl UsbDisplay {
    pub fn new(settings: UsbSettings) -> std::result::Result<Self, TransportError> {
        let context = Context::new()?;
        Ok(Self { context, settings })
    }

    pub fn settings(&self) -> &UsbSettings {
        &self.settings
    }

    /// Deliver one frame. The device is released on every exit path.
    pub fn write_frame(&self, frame: &Frame) -> std::result::Result<(), TransportError> {
        let handle = self.open()?;
        deliver(handle, frame.as_bytes(), self.settings.timeout)
    }

    /// Open the display. `NotFound` is reserved for a display that is not on
    /// the bus; a display that is present but cannot be opened (usually a
    /// permission problem) is reported with the underlying USB error.
    fn open(&self) -> std::result::Result<DeviceHandle<Context>, TransportError> {
        let devices = self.context.devices()?;
        let candidates = devices.iter().filter_map(|device| {
            let descriptor = device.device_descriptor().ok()?;
            Some((device, descriptor.vendor_id(), descriptor.product_id()))
        });
        let device = find_device(candidates, &self.settings)?;

        device
            .open()
            .map_err(|e| open_error(&self.settings, e))
    }
}

impl FrameSink for UsbDisplay {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        Ok(self.write_frame(frame)?)
    }
}

/// First candidate whose vendor/product ids match the settings.
fn find_device<D>(
    candidates: impl IntoIterator<Item = (D, u16, u16)>,
    settings: &UsbSettings,
) -> std::result::Result<D, TransportError> {
    candidates
        .into_iter()
        .find(|(_, vendor_id, product_id)| {
            *vendor_id == settings.vendor_id && *product_id == settings.product_id
        })
        .map(|(device, _, _)| device)
        .ok_or(TransportError::NotFound {
            vendor_id: settings.vendor_id,
            product_id: settings.product_id,
        })
}

fn open_error(settings: &UsbSettings, err: rusb::Error) -> TransportError {
    TransportError::Other(format!(
        "cannot open USB device {:04x}:{:04x}: {}",
        settings.vendor_id, settings.product_id, err
    ))
}

/// Configure an opened display, write `payload` and release it again.
fn deliver<H: DisplayHandle>(
    handle: H,
    payload: &[u8],
    timeout: Duration,
) -> std::result::Result<(), TransportError> {
    let mut session = DeviceSession::new(handle);
    let endpoint = session.prepare()?;
    session.write(endpoint, payload, timeout)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EndpointInfo {
    direction: Direction,
    transfer_type: TransferType,
    address: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InterfaceInfo {
    number: u8,
    endpoints: Vec<EndpointInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OutEndpoint {
    address: u8,
    transfer_type: TransferType,
}

/// The first OUT endpoint, in descriptor order.
fn select_out_endpoint(endpoints: &[EndpointInfo]) -> Option<OutEndpoint> {
    endpoints
        .iter()
        .find(|endpoint| endpoint.direction == Direction::Out)
        .map(|endpoint| OutEndpoint {
            address: endpoint.address,
            transfer_type: endpoint.transfer_type,
        })
}

/// The handle operations a delivery needs.
trait DisplayHandle {
    /// Detach a bound kernel driver from `interface`, if there is one.
    fn detach_driver(&mut self, interface: u8) -> rusb::Result<()>;
    /// Activate the first configuration.
    fn configure(&mut self) -> rusb::Result<()>;
    /// Alternate setting 0 of the first interface of the active configuration.
    fn first_interface(&mut self) -> rusb::Result<Option<InterfaceInfo>>;
    fn claim(&mut self, interface: u8) -> rusb::Result<()>;
    fn release(&mut self, interface: u8) -> rusb::Result<()>;
    fn transfer(
        &mut self,
        endpoint: OutEndpoint,
        payload: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize>;
}

impl<T: UsbContext> DisplayHandle for DeviceHandle<T> {
    fn detach_driver(&mut self, interface: u8) -> rusb::Result<()> {
        // kernel_driver_active is unsupported off Linux; nothing to detach there
        if let Ok(true) = self.kernel_driver_active(interface) {
            self.detach_kernel_driver(interface)?;
        }
        Ok(())
    }

    fn configure(&mut self) -> rusb::Result<()> {
        let first_config = self.device().config_descriptor(0)?;
        self.set_active_configuration(first_config.number())
    }

    fn first_interface(&mut self) -> rusb::Result<Option<InterfaceInfo>> {
        let config = self.device().active_config_descriptor()?;
        let interface = config
            .interfaces()
            .next()
            .and_then(|interface| interface.descriptors().next())
            .map(|descriptor| InterfaceInfo {
                number: descriptor.interface_number(),
                endpoints: descriptor
                    .endpoint_descriptors()
                    .map(|endpoint| EndpointInfo {
                        direction: endpoint.direction(),
                        transfer_type: endpoint.transfer_type(),
                        address: endpoint.address(),
                    })
                    .collect(),
            });
        Ok(interface)
    }

    fn claim(&mut self, interface: u8) -> rusb::Result<()> {
        self.claim_interface(interface)
    }

    fn release(&mut self, interface: u8) -> rusb::Result<()> {
        self.release_interface(interface)
    }

    fn transfer(
        &mut self,
        endpoint: OutEndpoint,
        payload: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        match endpoint.transfer_type {
            TransferType::Interrupt => self.write_interrupt(endpoint.address, payload, timeout),
            _ => self.write_bulk(endpoint.address, payload, timeout),
        }
    }
}

/// Scoped ownership of an opened display.
///
/// Dropping the session releases the claimed interface; dropping the inner
/// handle closes the device.
struct DeviceSession<H: DisplayHandle> {
    handle: H,
    claimed: Option<u8>,
}

impl<H: DisplayHandle> DeviceSession<H> {
    fn new(handle: H) -> Self {
        Self {
            handle,
            claimed: None,
        }
    }

    /// Detach the kernel driver, configure the device and find its OUT endpoint.
    fn prepare(&mut self) -> std::result::Result<OutEndpoint, TransportError> {
        self.handle.detach_driver(0)?;
        self.handle.configure()?;

        let interface = self
            .handle
            .first_interface()?
            .ok_or_else(|| TransportError::Other("active configuration has no interface".into()))?;
        let endpoint =
            select_out_endpoint(&interface.endpoints).ok_or(TransportError::EndpointMissing)?;

        self.handle.claim(interface.number)?;
        self.claimed = Some(interface.number);

        Ok(endpoint)
    }

    fn write(
        &mut self,
        endpoint: OutEndpoint,
        payload: &[u8],
        timeout: Duration,
    ) -> std::result::Result<(), TransportError> {
        let written = self
            .handle
            .transfer(endpoint, payload, timeout)
            .map_err(|e| TransportError::WriteFailed(e.to_string()))?;

        if written != payload.len() {
            return Err(TransportError::WriteFailed(format!(
                "short write: {} of {} bytes",
                written,
                payload.len()
            )));
        }
        Ok(())
    }
}

impl<H: DisplayHandle> Drop for DeviceSession<H> {
    fn drop(&mut self) {
        if let Some(number) = self.claimed.take() {
            let _ = self.handle.release(number);
        }
    }
}
