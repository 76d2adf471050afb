// Fake Frog — SD card over SPI, mounted as FAT at `SD_MOUNT_POINT`
//
// Once mounted, files are plain `std::fs` files, so the logger reaches the
// card through `storage::DirMedium`. The mount is undone when `SdCard` drops.

use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::sd::spi::SdSpiHostDriver;
use esp_idf_hal::sd::{SdCardConfiguration, SdCardDriver};
use esp_idf_hal::spi::{config::DriverConfig, Dma, SpiDriver, SPI2};
use esp_idf_svc::fs::fatfs::Fatfs;
use esp_idf_svc::io::vfs::MountedFatfs;
use esp_idf_hal::sys::EspError;

use crate::config::{SD_MAX_OPEN_FILES, SD_MOUNT_POINT};
use crate::error::StorageError;

type CardDriver = SdCardDriver<SdSpiHostDriver<'static, SpiDriver<'static>>>;

pub struct SdCard {
    _mount: MountedFatfs<Fatfs<CardDriver>>,
}

/// SPI pins wired to the card slot.
pub struct SdPins {
    pub sck: AnyIOPin,
    pub mosi: AnyIOPin,
    pub miso: AnyIOPin,
    pub cs: AnyIOPin,
}

impl SdCard {
    pub fn mount(spi: SPI2, pins: SdPins) -> Result<Self, StorageError> {
        Self::try_mount(spi, pins).map_err(|e| {
            log::error!("SD mount failed: {}", e);
            StorageError::Unavailable {
                path: SD_MOUNT_POINT.into(),
            }
        })
    }

    fn try_mount(spi: SPI2, pins: SdPins) -> Result<Self, EspError> {
        let spi_driver = SpiDriver::new(
            spi,
            pins.sck,
            pins.mosi,
            Some(pins.miso),
            &DriverConfig::default().dma(Dma::Auto(4096)),
        )?;

        let host = SdSpiHostDriver::new(
            spi_driver,
            Some(pins.cs),
            AnyIOPin::none(),
            AnyIOPin::none(),
            AnyIOPin::none(),
            #[cfg(not(any(
                esp_idf_version_major = "4",
                all(esp_idf_version_major = "5", esp_idf_version_minor = "0"),
                all(esp_idf_version_major = "5", esp_idf_version_minor = "1"),
            )))]
            None,
        )?;
        let card = SdCardDriver::new_spi(host, &SdCardConfiguration::new())?;

        let mount = MountedFatfs::mount(Fatfs::new_sdcard(0, card)?, SD_MOUNT_POINT, SD_MAX_OPEN_FILES)?;
        log::info!("SD card mounted at {}", SD_MOUNT_POINT);
        Ok(Self { _mount: mount })
    }
}
