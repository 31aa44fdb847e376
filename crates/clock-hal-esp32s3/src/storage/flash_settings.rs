//! Settings persistence in the last sector of a spare data partition.
//!
//! One fixed-size record: magic, version, scalar fields, four length-prefixed
//! strings and an FNV-1a checksum over everything before it.

use clock_core::settings::{
    NTP_SERVER_MAX_LEN, PASSWORD_MAX_LEN, PersistedSettings, SSID_MAX_LEN, SettingsStore,
    TIMEZONE_MAX_LEN,
};
use embedded_storage::{ReadStorage, Storage};
use esp_bootloader_esp_idf::partitions::{
    DataPartitionSubType, PARTITION_TABLE_MAX_LEN, PartitionType, read_partition_table,
};
use esp_rom_sys::rom::spiflash::{
    ESP_ROM_SPIFLASH_RESULT_OK, esp_rom_spiflash_erase_sector, esp_rom_spiflash_read,
    esp_rom_spiflash_unlock, esp_rom_spiflash_write,
};
use heapless::String;
use log::{debug, info};

const FLASH_SECTOR_SIZE: u32 = 4096;
const DEFAULT_FLASH_CAPACITY_BYTES: usize = 4 * 1024 * 1024;

const SETTINGS_MAGIC: u32 = u32::from_le_bytes(*b"CYD1");
const SETTINGS_VERSION: u8 = 1;
const SETTINGS_RECORD_LEN: usize = 256;
const CHECKSUM_OFFSET: usize = SETTINGS_RECORD_LEN - 4;

const FLAG_ROTATED: u8 = 0x01;

const OFF_FLAGS: usize = 5;
const OFF_BRIGHTNESS: usize = 6;
const OFF_LED: usize = 7;
const OFF_INTERVAL: usize = 8;
const OFF_SSID: usize = 12;
const OFF_PASSWORD: usize = OFF_SSID + 1 + SSID_MAX_LEN;
const OFF_TIMEZONE: usize = OFF_PASSWORD + 1 + PASSWORD_MAX_LEN;
const OFF_SERVER: usize = OFF_TIMEZONE + 1 + TIMEZONE_MAX_LEN;
const RECORD_BODY_END: usize = OFF_SERVER + 1 + NTP_SERVER_MAX_LEN;

const _: () = assert!(RECORD_BODY_END <= CHECKSUM_OFFSET);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FlashSettingsError {
    PartitionTable,
    SettingsPartitionMissing,
    PartitionTooSmall,
    FlashOpFailed(i32),
    Corrupted,
    Unsupported,
}

#[derive(Debug)]
struct RawFlash;

impl RawFlash {
    fn new() -> Result<Self, FlashSettingsError> {
        let rc = unsafe { esp_rom_spiflash_unlock() };
        check(rc)?;
        Ok(Self)
    }

    fn erase_sector(&mut self, sector_addr: u32) -> Result<(), FlashSettingsError> {
        if !sector_addr.is_multiple_of(FLASH_SECTOR_SIZE) {
            return Err(FlashSettingsError::Unsupported);
        }
        check(unsafe { esp_rom_spiflash_erase_sector(sector_addr / FLASH_SECTOR_SIZE) })
    }

    fn read_word(&mut self, addr: u32) -> Result<u32, FlashSettingsError> {
        let mut word = 0u32;
        check(unsafe { esp_rom_spiflash_read(addr, &mut word as *mut u32 as *const u32, 4) })?;
        Ok(word)
    }

    fn write_word(&mut self, addr: u32, word: u32) -> Result<(), FlashSettingsError> {
        check(unsafe { esp_rom_spiflash_write(addr, &word as *const u32, 4) })
    }

    /// The ROM routines move whole words; unaligned edges are read through.
    fn read_bytes(&mut self, addr: u32, out: &mut [u8]) -> Result<(), FlashSettingsError> {
        let start = addr & !0b11;
        let end = (addr + out.len() as u32 + 3) & !0b11;

        for word_addr in (start..end).step_by(4) {
            let bytes = self.read_word(word_addr)?.to_le_bytes();
            for (i, byte) in bytes.iter().enumerate() {
                let pos = i64::from(word_addr) + i as i64 - i64::from(addr);
                if let Some(slot) = usize::try_from(pos).ok().and_then(|pos| out.get_mut(pos)) {
                    *slot = *byte;
                }
            }
        }
        Ok(())
    }

    /// Writes into an erased region; bytes outside `data` stay 0xFF.
    fn write_erased_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashSettingsError> {
        let start = addr & !0b11;
        let end = (addr + data.len() as u32 + 3) & !0b11;

        for word_addr in (start..end).step_by(4) {
            let mut bytes = [0xFFu8; 4];
            for (i, slot) in bytes.iter_mut().enumerate() {
                let pos = i64::from(word_addr) + i as i64 - i64::from(addr);
                if let Some(byte) = usize::try_from(pos).ok().and_then(|pos| data.get(pos)) {
                    *slot = *byte;
                }
            }
            self.write_word(word_addr, u32::from_le_bytes(bytes))?;
        }
        Ok(())
    }
}

fn check(rc: i32) -> Result<(), FlashSettingsError> {
    if rc == ESP_ROM_SPIFLASH_RESULT_OK {
        Ok(())
    } else {
        Err(FlashSettingsError::FlashOpFailed(rc))
    }
}

impl ReadStorage for RawFlash {
    type Error = FlashSettingsError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.read_bytes(offset, bytes)
    }

    fn capacity(&self) -> usize {
        DEFAULT_FLASH_CAPACITY_BYTES
    }
}

impl Storage for RawFlash {
    fn write(&mut self, _offset: u32, _bytes: &[u8]) -> Result<(), Self::Error> {
        Err(FlashSettingsError::Unsupported)
    }
}

#[derive(Debug)]
pub struct FlashSettingsStore {
    flash: RawFlash,
    settings_sector_addr: u32,
}

impl FlashSettingsStore {
    /// Locate the settings sector: the last sector of the first writable
    /// undefined-data partition, else of the NVS partition.
    pub fn new() -> Result<Self, FlashSettingsError> {
        let mut flash = RawFlash::new()?;

        let mut table_buf = [0u8; PARTITION_TABLE_MAX_LEN];
        let table = read_partition_table(&mut flash, &mut table_buf)
            .map_err(|_| FlashSettingsError::PartitionTable)?;

        let mut data_undefined: Option<(u32, u32)> = None;
        let mut fallback_nvs: Option<(u32, u32)> = None;

        for entry in table.iter() {
            if entry.is_read_only() {
                continue;
            }
            match entry.partition_type() {
                PartitionType::Data(DataPartitionSubType::Undefined) => {
                    data_undefined = Some((entry.offset(), entry.len()));
                    break;
                }
                PartitionType::Data(DataPartitionSubType::Nvs) if fallback_nvs.is_none() => {
                    fallback_nvs = Some((entry.offset(), entry.len()));
                }
                _ => {}
            }
        }

        let (offset, len) = data_undefined
            .or(fallback_nvs)
            .ok_or(FlashSettingsError::SettingsPartitionMissing)?;
        if len < FLASH_SECTOR_SIZE {
            return Err(FlashSettingsError::PartitionTooSmall);
        }

        let settings_sector_addr = offset + len - FLASH_SECTOR_SIZE;
        info!("settings: record at flash 0x{:x}", settings_sector_addr);
        Ok(Self {
            flash,
            settings_sector_addr,
        })
    }
}

impl SettingsStore for FlashSettingsStore {
    type Error = FlashSettingsError;

    fn load(&mut self) -> Result<Option<PersistedSettings>, Self::Error> {
        let mut buf = [0u8; SETTINGS_RECORD_LEN];
        self.flash.read_bytes(self.settings_sector_addr, &mut buf)?;
        decode_record(&buf)
    }

    fn save(&mut self, settings: &PersistedSettings) -> Result<(), Self::Error> {
        let buf = encode_record(settings);
        self.flash.erase_sector(self.settings_sector_addr)?;
        self.flash
            .write_erased_bytes(self.settings_sector_addr, &buf)?;
        debug!("settings: saved");
        Ok(())
    }
}

fn encode_record(settings: &PersistedSettings) -> [u8; SETTINGS_RECORD_LEN] {
    let mut buf = [0u8; SETTINGS_RECORD_LEN];
    buf[0..4].copy_from_slice(&SETTINGS_MAGIC.to_le_bytes());
    buf[4] = SETTINGS_VERSION;
    buf[OFF_FLAGS] = if settings.rotated { FLAG_ROTATED } else { 0 };
    buf[OFF_BRIGHTNESS] = settings.brightness;
    buf[OFF_LED] = settings.led_brightness;
    buf[OFF_INTERVAL..OFF_INTERVAL + 4].copy_from_slice(&settings.ntp_interval_secs.to_le_bytes());
    put_str(&mut buf[OFF_SSID..], &settings.ssid);
    put_str(&mut buf[OFF_PASSWORD..], &settings.password);
    put_str(&mut buf[OFF_TIMEZONE..], &settings.timezone);
    put_str(&mut buf[OFF_SERVER..], &settings.ntp_server);

    let checksum = checksum32(&buf[..CHECKSUM_OFFSET]);
    buf[CHECKSUM_OFFSET..].copy_from_slice(&checksum.to_le_bytes());
    buf
}

/// `Ok(None)` for an erased sector or a record this build does not know.
fn decode_record(
    buf: &[u8; SETTINGS_RECORD_LEN],
) -> Result<Option<PersistedSettings>, FlashSettingsError> {
    let magic = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if magic != SETTINGS_MAGIC || buf[4] != SETTINGS_VERSION {
        return Ok(None);
    }

    let expected = u32::from_le_bytes([
        buf[CHECKSUM_OFFSET],
        buf[CHECKSUM_OFFSET + 1],
        buf[CHECKSUM_OFFSET + 2],
        buf[CHECKSUM_OFFSET + 3],
    ]);
    if checksum32(&buf[..CHECKSUM_OFFSET]) != expected {
        return Err(FlashSettingsError::Corrupted);
    }

    Ok(Some(PersistedSettings {
        ssid: get_str(&buf[OFF_SSID..])?,
        password: get_str(&buf[OFF_PASSWORD..])?,
        timezone: get_str(&buf[OFF_TIMEZONE..])?,
        brightness: buf[OFF_BRIGHTNESS],
        led_brightness: buf[OFF_LED],
        rotated: buf[OFF_FLAGS] & FLAG_ROTATED != 0,
        ntp_interval_secs: u32::from_le_bytes([
            buf[OFF_INTERVAL],
            buf[OFF_INTERVAL + 1],
            buf[OFF_INTERVAL + 2],
            buf[OFF_INTERVAL + 3],
        ]),
        ntp_server: get_str(&buf[OFF_SERVER..])?,
    }))
}

fn put_str<const N: usize>(field: &mut [u8], value: &String<N>) {
    field[0] = value.len() as u8;
    field[1..1 + value.len()].copy_from_slice(value.as_bytes());
}

fn get_str<const N: usize>(field: &[u8]) -> Result<String<N>, FlashSettingsError> {
    let len = usize::from(field[0]);
    if len > N {
        return Err(FlashSettingsError::Corrupted);
    }
    let text = core::str::from_utf8(&field[1..1 + len]).map_err(|_| FlashSettingsError::Corrupted)?;
    let mut out = String::new();
    out.push_str(text)
        .map_err(|_| FlashSettingsError::Corrupted)?;
    Ok(out)
}

fn checksum32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811C_9DC5u32;
    for b in bytes {
        hash ^= u32::from(*b);
        hash = hash.wrapping_mul(16_777_619);
    }
    hash
}
