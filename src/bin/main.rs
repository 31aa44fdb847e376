#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use core::sync::atomic::AtomicBool;

use clock_core::{
    app::{ModeController, TickResult},
    connection::{ConnectionManager, RadioEvents},
    mailbox::EventMailbox,
    sync::{SyncStatus, TimeSyncManager},
};
use clock_hal_esp32s3::{
    input::{button::BootButton, touch::Xpt2046},
    network::{RadioLink, sntp::SntpLink, sntp::sntp_worker, worker::radio_worker},
    platform::{
        board::CydBoard,
        clock::SystemClock,
        display::{ActiveLowLed, Backlight, orientation},
    },
};
use embassy_executor::Spawner;
use embassy_time::Timer;
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    clock::CpuClock,
    gpio::{DriveMode, Input, InputConfig, Level, Output, OutputConfig, Pull},
    ledc::{
        LSGlobalClkSource, Ledc, LowSpeed,
        channel::{self, ChannelIFace},
        timer::{self, TimerIFace},
    },
    spi::{
        Mode,
        master::{Config as SpiConfig, Spi},
    },
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_radio::wifi::{ClientConfig, ModeConfig};
use log::{LevelFilter, info};
use mipidsi::{
    Builder as MipidsiBuilder, interface::SpiInterface, models::ILI9341Rgb565,
    options::ColorOrder,
};
use static_cell::StaticCell;

use settings_backend::SettingsBackend;

#[path = "main/settings_backend.rs"]
mod settings_backend;

const DISPLAY_SPI_MHZ: u32 = 40;
const TOUCH_SPI_MHZ: u32 = 1;
const PWM_FREQUENCY_KHZ: u32 = 5;
/// Native portrait size of the ILI9341; the orientation turns it landscape.
const PANEL_NATIVE_WIDTH: u16 = 240;
const PANEL_NATIVE_HEIGHT: u16 = 320;

const FALLBACK_SSID: &str = match option_env!("CYD_CLOCK_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};
const FALLBACK_PASSWORD: &str = match option_env!("CYD_CLOCK_WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};

static RADIO_EVENTS: RadioEvents = EventMailbox::new();
static RADIO_LINK: RadioLink = RadioLink::new();
static SNTP_LINK: SntpLink = SntpLink::new();
static SYNC_STATUS: SyncStatus = SyncStatus::new();
static WALL_CLOCK: SystemClock = SystemClock::new();
static TOUCH_ROTATED: AtomicBool = AtomicBool::new(false);
static NET_RESOURCES: StaticCell<embassy_net::StackResources<4>> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: cyd-clock starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Panel wiring: SCK=GPIO12 MOSI=GPIO11 CS=GPIO10 DC=GPIO9 BL=GPIO21
    let display_spi = Spi::new(
        peripherals.SPI2,
        SpiConfig::default()
            .with_frequency(Rate::from_mhz(DISPLAY_SPI_MHZ))
            .with_mode(Mode::_0),
    )
    .unwrap()
    .with_sck(peripherals.GPIO12)
    .with_mosi(peripherals.GPIO11);
    let display_cs = Output::new(peripherals.GPIO10, Level::High, OutputConfig::default());
    let display_device = ExclusiveDevice::new_no_delay(display_spi, display_cs).unwrap();
    let display_dc = Output::new(peripherals.GPIO9, Level::Low, OutputConfig::default());
    let mut spi_buffer = [0u8; 512];
    let display_interface = SpiInterface::new(display_device, display_dc, &mut spi_buffer);
    let panel = MipidsiBuilder::new(ILI9341Rgb565, display_interface)
        .display_size(PANEL_NATIVE_WIDTH, PANEL_NATIVE_HEIGHT)
        .orientation(orientation(false))
        .color_order(ColorOrder::Bgr)
        .init(&mut embassy_time::Delay)
        .unwrap();
    esp_println::println!("display: init ok");

    // Touch wiring: SCK=GPIO4 MOSI=GPIO5 MISO=GPIO6 CS=GPIO7 IRQ=GPIO15
    let touch_spi = Spi::new(
        peripherals.SPI3,
        SpiConfig::default()
            .with_frequency(Rate::from_mhz(TOUCH_SPI_MHZ))
            .with_mode(Mode::_0),
    )
    .unwrap()
    .with_sck(peripherals.GPIO4)
    .with_mosi(peripherals.GPIO5)
    .with_miso(peripherals.GPIO6);
    let touch_cs = Output::new(peripherals.GPIO7, Level::High, OutputConfig::default());
    let touch_device = ExclusiveDevice::new_no_delay(touch_spi, touch_cs).unwrap();
    let touch_irq = Input::new(
        peripherals.GPIO15,
        InputConfig::default().with_pull(Pull::Up),
    );
    let touch = Xpt2046::new(touch_device, touch_irq, &TOUCH_ROTATED);

    // Backlight on GPIO21, RGB LED R=GPIO16 G=GPIO17 B=GPIO18 (active low).
    let mut ledc = Ledc::new(peripherals.LEDC);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
    let mut pwm_timer = ledc.timer::<LowSpeed>(timer::Number::Timer0);
    pwm_timer
        .configure(timer::config::Config {
            duty: timer::config::Duty::Duty8Bit,
            clock_source: timer::LSClockSource::APBClk,
            frequency: Rate::from_khz(PWM_FREQUENCY_KHZ),
        })
        .unwrap();
    let mut backlight_pwm = ledc.channel(channel::Number::Channel0, peripherals.GPIO21);
    backlight_pwm
        .configure(channel::config::Config {
            timer: &pwm_timer,
            duty_pct: 100,
            drive_mode: DriveMode::PushPull,
        })
        .unwrap();
    let mut led_red_pwm = ledc.channel(channel::Number::Channel1, peripherals.GPIO16);
    led_red_pwm
        .configure(channel::config::Config {
            timer: &pwm_timer,
            duty_pct: 100,
            drive_mode: DriveMode::PushPull,
        })
        .unwrap();
    let _led_green = Output::new(peripherals.GPIO17, Level::High, OutputConfig::default());
    let _led_blue = Output::new(peripherals.GPIO18, Level::High, OutputConfig::default());

    let boot_button = Input::new(
        peripherals.GPIO0,
        InputConfig::default().with_pull(Pull::Up),
    );

    let board = CydBoard::new(
        panel,
        Backlight::new(backlight_pwm),
        ActiveLowLed::new(led_red_pwm),
        BootButton::new(boot_button),
        &TOUCH_ROTATED,
    );

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                loop {
                    Timer::after_secs(1).await;
                }
            }
        };

    if let Err(err) = wifi_controller.set_config(&ModeConfig::Client(ClientConfig::default())) {
        info!("wifi mode config failed: {:?}", err);
        loop {
            Timer::after_secs(1).await;
        }
    }

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<4>::new()),
        0x3C1D_C10C_0B5E_ED01,
    );

    let connection = ConnectionManager::new(RADIO_LINK.client(), &RADIO_EVENTS);
    let sync = TimeSyncManager::new(SNTP_LINK.handle(), &SYNC_STATUS);
    let mut app = ModeController::new(
        connection,
        sync,
        touch,
        SettingsBackend::open(),
        board,
    )
    .with_fallback_credentials(FALLBACK_SSID, FALLBACK_PASSWORD);

    info!("Display pins: SCK=GPIO12 MOSI=GPIO11 CS=GPIO10 DC=GPIO9 BL=GPIO21");
    info!("Touch pins: SCK=GPIO4 MOSI=GPIO5 MISO=GPIO6 CS=GPIO7 IRQ=GPIO15");
    info!("LED pins: R=GPIO16 G=GPIO17 B=GPIO18, settings button GPIO0");

    let net_future = net_runner.run();
    let radio_future = radio_worker(&mut wifi_controller, stack, &RADIO_LINK, &RADIO_EVENTS);
    let sntp_future = sntp_worker(stack, &SNTP_LINK, &SYNC_STATUS, &WALL_CLOCK);
    let ui_future = async {
        loop {
            if app.tick(WALL_CLOCK.now()) == TickResult::RenderRequested {
                app.with_view(|board, view| board.render(view));
            }

            let delay_ms = app.next_poll_delay_ms(WALL_CLOCK.now());
            Timer::after_millis(u64::from(delay_ms)).await;
        }
    };

    let _ = embassy_futures::join::join4(net_future, radio_future, sntp_future, ui_future).await;
    unreachable!()
}
