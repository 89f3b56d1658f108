//! Digital input pins.
//!
//! [`SensorInput`] is the capability the monitor polls: the raw level of one
//! contact. Two adapters are provided:
//!
//! - [`HalPin`] wraps any `embedded-hal` 1.0 input pin.
//! - [`RpiPin`] (feature `rpi`) drives a Raspberry Pi GPIO line configured as
//!   an input with the internal pull-up enabled. The line is reset to its
//!   previous mode when the pin is dropped.

use embedded_hal::digital::Error as _;

#[derive(Debug, thiserror::Error)]
pub enum PinError {
    #[cfg(feature = "rpi")]
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    #[error("Pin read failed: {0}")]
    Read(String),

    #[error("GPIO support is not compiled in (enable the `rpi` feature)")]
    Unsupported,
}

/// Raw level of one physical contact.
pub trait SensorInput: Send {
    /// `true` when the input is at logic high.
    fn is_high(&mut self) -> Result<bool, PinError>;
}

// ---------------------------------------------------------------------------
// embedded-hal adapter
// ---------------------------------------------------------------------------

/// Adapter for pins implementing [`embedded_hal::digital::InputPin`].
pub struct HalPin<P>(pub P);

impl<P> SensorInput for HalPin<P>
where
    P: embedded_hal::digital::InputPin + Send,
{
    fn is_high(&mut self) -> Result<bool, PinError> {
        self.0
            .is_high()
            .map_err(|e| PinError::Read(format!("{:?}", e.kind())))
    }
}

// ---------------------------------------------------------------------------
// Raspberry Pi adapter
// ---------------------------------------------------------------------------

#[cfg(feature = "rpi")]
pub struct RpiPin {
    pin: rppal::gpio::InputPin,
}

#[cfg(feature = "rpi")]
impl SensorInput for RpiPin {
    fn is_high(&mut self) -> Result<bool, PinError> {
        Ok(self.pin.is_high())
    }
}

/// Open the given BCM GPIO lines as pulled-up inputs, in order.
///
/// Fails if the GPIO peripheral cannot be accessed or any line is
/// unavailable; no partially opened set is returned.
#[cfg(feature = "rpi")]
pub fn open_pins(bcm_pins: &[u8]) -> Result<Vec<Box<dyn SensorInput>>, PinError> {
    let gpio = rppal::gpio::Gpio::new()?;
    let mut opened: Vec<Box<dyn SensorInput>> = Vec::with_capacity(bcm_pins.len());

    for &bcm in bcm_pins {
        let pin = gpio.get(bcm)?.into_input_pullup();
        tracing::info!(gpio_pin = bcm, "GPIO input initialised with pull-up");
        opened.push(Box::new(RpiPin { pin }));
    }

    Ok(opened)
}

#[cfg(not(feature = "rpi"))]
pub fn open_pins(_bcm_pins: &[u8]) -> Result<Vec<Box<dyn SensorInput>>, PinError> {
    Err(PinError::Unsupported)
}
