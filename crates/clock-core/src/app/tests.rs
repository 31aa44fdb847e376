use core::cell::{Cell, RefCell};

use super::*;
use crate::{
    connection::{RAW_SCAN_CAPACITY, RadioEvent, RadioEvents},
    render::NtpView,
    screens::{
        SetupState,
        keyboard::{
            HOST_BOTTOM_ROW_Y, HOST_CANCEL_X, HOST_DONE_X, SPECIAL_ROW_Y, host_key_origin,
            password_key_origin,
        },
        layout::{
            LIST_START_Y, NTP_INTERVAL_GAP, NTP_INTERVAL_W, NTP_INTERVAL_X, NTP_INTERVAL_Y,
            NTP_SERVER_BOX_Y, NTP_SYNC_X, NTP_SYNC_Y, SLIDER_BTN_X1, settings_row_y,
        },
    },
    settings::truncated,
    sync::SyncStatus,
};

const BOOT_UNIX_MS: i64 = 1_767_225_600_000;

struct FakeRadio<'t> {
    events: &'t RadioEvents,
    good_password: &'static str,
    password: std::string::String,
    scan: std::vec::Vec<(&'static str, i8)>,
}

impl<'t> FakeRadio<'t> {
    fn new(events: &'t RadioEvents, good_password: &'static str) -> Self {
        Self {
            events,
            good_password,
            password: std::string::String::new(),
            scan: std::vec![("HomeNet", -48), ("Cafe", -71)],
        }
    }
}

impl WifiRadio for FakeRadio<'_> {
    type Error = ();

    fn start(&mut self) -> Result<(), Self::Error> {
        self.events.post(RadioEvent::StaStarted);
        Ok(())
    }

    fn configure(&mut self, _ssid: &str, password: &str) -> Result<(), Self::Error> {
        self.password = password.into();
        Ok(())
    }

    fn connect(&mut self) -> Result<(), Self::Error> {
        if self.password == self.good_password {
            self.events.post(RadioEvent::GotAddress);
        }
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn start_scan(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn poll_scan(
        &mut self,
        out: &mut Vec<Network, RAW_SCAN_CAPACITY>,
    ) -> Result<bool, Self::Error> {
        for (ssid, rssi) in &self.scan {
            let _ = out.push(Network {
                ssid: truncated(ssid),
                rssi: *rssi,
                secured: true,
            });
        }
        Ok(true)
    }
}

struct FakeSntp<'t> {
    starts: &'t RefCell<std::vec::Vec<(std::string::String, u64)>>,
}

impl SntpClient for FakeSntp<'_> {
    type Error = ();

    fn start(&mut self, server: &str, interval_ms: u64) -> Result<(), Self::Error> {
        self.starts.borrow_mut().push((server.into(), interval_ms));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

struct SharedTouch<'t>(&'t Cell<TouchSample>);

impl TouchSource for SharedTouch<'_> {
    type Error = ();

    fn poll(&mut self) -> Result<TouchSample, Self::Error> {
        Ok(self.0.get())
    }
}

struct MemoryStore<'t> {
    slot: &'t RefCell<Option<PersistedSettings>>,
    fail_load: bool,
}

impl SettingsStore for MemoryStore<'_> {
    type Error = &'static str;

    fn load(&mut self) -> Result<Option<PersistedSettings>, Self::Error> {
        if self.fail_load {
            return Err("corrupted");
        }
        Ok(self.slot.borrow().clone())
    }

    fn save(&mut self, settings: &PersistedSettings) -> Result<(), Self::Error> {
        *self.slot.borrow_mut() = Some(settings.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingBoard<'t> {
    button: Option<&'t Cell<bool>>,
    clears: u32,
    backlight: Option<u8>,
    indicator: Option<u8>,
    rotated: Option<bool>,
}

impl Board for RecordingBoard<'_> {
    fn clear_screen(&mut self) {
        self.clears += 1;
    }

    fn set_backlight(&mut self, level: u8) {
        self.backlight = Some(level);
    }

    fn set_indicator(&mut self, level: u8) {
        self.indicator = Some(level);
    }

    fn set_rotation(&mut self, rotated: bool) {
        self.rotated = Some(rotated);
    }

    fn settings_button_pressed(&mut self) -> bool {
        self.button.is_some_and(|button| button.replace(false))
    }
}

type TestApp<'t> =
    ModeController<'t, FakeRadio<'t>, FakeSntp<'t>, SharedTouch<'t>, MemoryStore<'t>, RecordingBoard<'t>>;

struct Rig {
    events: RadioEvents,
    status: SyncStatus,
    starts: RefCell<std::vec::Vec<(std::string::String, u64)>>,
    stored: RefCell<Option<PersistedSettings>>,
    touch: Cell<TouchSample>,
    button: Cell<bool>,
}

impl Rig {
    fn new(stored: Option<PersistedSettings>) -> Self {
        Self {
            events: RadioEvents::new(),
            status: SyncStatus::new(),
            starts: RefCell::new(std::vec::Vec::new()),
            stored: RefCell::new(stored),
            touch: Cell::new(TouchSample::RELEASED),
            button: Cell::new(false),
        }
    }

    fn app(&self, good_password: &'static str) -> TestApp<'_> {
        self.app_with_store(good_password, false)
    }

    fn app_with_store(&self, good_password: &'static str, fail_load: bool) -> TestApp<'_> {
        ModeController::new(
            ConnectionManager::new(FakeRadio::new(&self.events, good_password), &self.events),
            TimeSyncManager::new(
                FakeSntp {
                    starts: &self.starts,
                },
                &self.status,
            ),
            SharedTouch(&self.touch),
            MemoryStore {
                slot: &self.stored,
                fail_load,
            },
            RecordingBoard {
                button: Some(&self.button),
                ..RecordingBoard::default()
            },
        )
    }

    fn stored(&self) -> PersistedSettings {
        self.stored.borrow().clone().unwrap_or_default()
    }
}

struct Driver {
    now: Now,
}

impl Driver {
    fn new() -> Self {
        Self {
            now: Now::new(0, BOOT_UNIX_MS),
        }
    }

    fn step(&mut self, app: &mut TestApp<'_>, ms: u64) -> TickResult {
        self.now = self.now.advanced_by(ms);
        app.tick(self.now)
    }

    fn idle(&mut self, app: &mut TestApp<'_>, total_ms: u64) {
        let mut spent = 0;
        while spent < total_ms {
            self.step(app, 50);
            spent += 50;
        }
    }

    /// Lift, press at (x, y), lift again.
    fn tap(&mut self, app: &mut TestApp<'_>, touch: &Cell<TouchSample>, x: i16, y: i16) {
        touch.set(TouchSample::RELEASED);
        self.step(app, 250);
        touch.set(TouchSample::pressed_at(x, y));
        self.step(app, 50);
        touch.set(TouchSample::RELEASED);
        self.step(app, 50);
    }

    /// Splash, then the first mode decision.
    fn boot(&mut self, app: &mut TestApp<'_>) {
        assert_eq!(app.tick(self.now), TickResult::RenderRequested);
        assert_eq!(app.mode(), AppMode::Init);
        assert_eq!(self.step(app, 250), TickResult::NoRender);
        assert_eq!(app.mode(), AppMode::Init);
        self.step(app, 250);
    }
}

fn home_settings(password: &str) -> PersistedSettings {
    PersistedSettings::default().with_credentials("HomeNet", password)
}

fn setup_state(app: &TestApp<'_>) -> Option<SetupState> {
    match app.screen() {
        ActiveScreen::Setup(screen) => Some(screen.state()),
        _ => None,
    }
}

/// Server shown by the NTP screen and whether its keyboard is open.
fn ntp_server(app: &TestApp<'_>) -> Option<(std::string::String, bool)> {
    match app.screen() {
        ActiveScreen::Ntp(screen) => Some(match screen.view() {
            NtpView::Main { server, .. } => (server.into(), false),
            NtpView::Keyboard { server, .. } => (server.into(), true),
        }),
        _ => None,
    }
}

fn boot_to_clock<'t>(rig: &'t Rig, driver: &mut Driver) -> TestApp<'t> {
    let mut app = rig.app("secret");
    driver.boot(&mut app);
    assert_eq!(app.mode(), AppMode::Connecting);
    driver.step(&mut app, 50);
    assert_eq!(app.mode(), AppMode::Clock);
    app
}

#[test]
fn first_boot_goes_through_setup_and_starts_sync_once() {
    let rig = Rig::new(None);
    let mut driver = Driver::new();
    let mut app = rig.app("");

    driver.boot(&mut app);
    assert_eq!(app.mode(), AppMode::WifiSetup);
    assert_eq!(app.return_target(), ReturnTarget::Boot);
    assert_eq!(app.board().backlight, Some(255));
    assert_eq!(app.board().indicator, Some(0));

    driver.step(&mut app, 50);
    driver.step(&mut app, 50);
    assert_eq!(setup_state(&app), Some(SetupState::NetworkList));

    driver.tap(&mut app, &rig.touch, 100, LIST_START_Y + 5);
    assert_eq!(setup_state(&app), Some(SetupState::PasswordEntry));

    driver.tap(&mut app, &rig.touch, 300, SPECIAL_ROW_Y + 5);
    assert!(matches!(
        setup_state(&app),
        Some(SetupState::Connected { .. })
    ));
    assert!(!app.is_sync_started());

    driver.idle(&mut app, 1_000);
    assert_eq!(app.mode(), AppMode::Clock);
    assert!(app.is_sync_started());
    assert!(app.connection_state().associated);

    let stored = rig.stored();
    assert_eq!(stored.ssid.as_str(), "HomeNet");
    assert_eq!(stored.password.as_str(), "");

    driver.tap(&mut app, &rig.touch, 160, 120);
    assert_eq!(app.mode(), AppMode::Settings);
    driver.tap(&mut app, &rig.touch, 160, settings_row_y(7) + 5);
    assert_eq!(app.mode(), AppMode::Clock);

    let starts = rig.starts.borrow();
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0], ("pool.ntp.org".into(), 86_400_000));
}

#[test]
fn stored_credentials_that_never_connect_fall_back_to_setup() {
    let rig = Rig::new(Some(home_settings("wrong")));
    let mut driver = Driver::new();
    let mut app = rig.app("right");

    driver.boot(&mut app);
    assert_eq!(app.mode(), AppMode::Connecting);

    driver.idle(&mut app, 14_950);
    assert_eq!(app.mode(), AppMode::Connecting);

    driver.step(&mut app, 50);
    assert_eq!(app.mode(), AppMode::WifiSetup);
    assert_eq!(app.return_target(), ReturnTarget::Boot);
    assert_eq!(
        app.connection_state().last_error,
        Some(crate::error::ClockError::ConnectionTimeout)
    );
    assert!(!app.is_sync_started());
    assert!(rig.starts.borrow().is_empty());
}

#[test]
fn wrong_password_in_setup_times_out_and_allows_retry() {
    let rig = Rig::new(None);
    let mut driver = Driver::new();
    let mut app = rig.app("secret");

    driver.boot(&mut app);
    driver.idle(&mut app, 100);
    driver.tap(&mut app, &rig.touch, 100, LIST_START_Y + 5);

    let (x, y) = password_key_origin(1, 0, 10);
    driver.tap(&mut app, &rig.touch, x + 5, y + 5);
    driver.tap(&mut app, &rig.touch, 300, SPECIAL_ROW_Y + 5);
    assert_eq!(setup_state(&app), Some(SetupState::Connecting));

    driver.idle(&mut app, 15_000);
    assert_eq!(setup_state(&app), Some(SetupState::Failed));
    assert_eq!(app.mode(), AppMode::WifiSetup);

    driver.tap(&mut app, &rig.touch, 160, 120);
    assert_eq!(setup_state(&app), Some(SetupState::PasswordEntry));
    assert!(!rig.stored().has_credentials());
}

#[test]
fn ntp_interval_and_sync_now_from_settings() {
    let rig = Rig::new(Some(home_settings("secret")));
    let mut driver = Driver::new();
    let mut app = boot_to_clock(&rig, &mut driver);
    rig.status.record_sync(BOOT_UNIX_MS / 1_000);

    driver.tap(&mut app, &rig.touch, 160, 120);
    assert_eq!(app.mode(), AppMode::Settings);
    driver.tap(&mut app, &rig.touch, 100, settings_row_y(2) + 5);
    assert_eq!(app.mode(), AppMode::NtpConfig);

    driver.tap(
        &mut app,
        &rig.touch,
        NTP_INTERVAL_X + NTP_INTERVAL_W + NTP_INTERVAL_GAP + 5,
        NTP_INTERVAL_Y + 5,
    );
    assert_eq!(rig.stored().ntp_interval_secs, 3_600);
    assert_eq!(app.sync_stats(driver.now).interval_secs, 3_600);
    assert!(app.sync_stats(driver.now).synced);

    driver.tap(&mut app, &rig.touch, NTP_SYNC_X + 5, NTP_SYNC_Y + 5);
    assert_eq!(app.mode(), AppMode::Clock);
    assert!(!app.sync_stats(driver.now).synced);

    let starts = rig.starts.borrow();
    let intervals: std::vec::Vec<u64> = starts.iter().map(|(_, ms)| *ms).collect();
    assert_eq!(intervals, [86_400_000, 3_600_000, 3_600_000]);
}

#[test]
fn picked_timezone_is_persisted_and_applied() {
    let rig = Rig::new(Some(home_settings("secret")));
    let mut driver = Driver::new();
    let mut app = boot_to_clock(&rig, &mut driver);

    driver.tap(&mut app, &rig.touch, 160, 120);
    driver.tap(&mut app, &rig.touch, 100, settings_row_y(0) + 5);
    assert_eq!(app.mode(), AppMode::Timezone);

    let offset = match app.screen() {
        ActiveScreen::Timezone(screen) => screen.view().offset,
        _ => panic!("timezone screen not active"),
    };
    let zone = &crate::tz::TIMEZONES[offset + 1];

    driver.tap(&mut app, &rig.touch, 100, LIST_START_Y + 28 + 5);
    assert_eq!(app.mode(), AppMode::Settings);
    assert_eq!(rig.stored().timezone.as_str(), zone.posix);
    assert_eq!(app.settings().timezone.as_str(), zone.posix);

    let expected = TimeZone::from_posix_or_utc(zone.posix).to_local(driver.now.unix_secs());
    assert_eq!(app.local_time(driver.now), expected);
}

#[test]
fn setup_cancel_returns_to_settings_when_opened_there() {
    let rig = Rig::new(Some(home_settings("secret")));
    let mut driver = Driver::new();
    let mut app = boot_to_clock(&rig, &mut driver);

    driver.tap(&mut app, &rig.touch, 160, 120);
    driver.tap(&mut app, &rig.touch, 100, settings_row_y(1) + 5);
    assert_eq!(app.mode(), AppMode::WifiSetup);
    assert_eq!(app.return_target(), ReturnTarget::Settings);

    driver.tap(&mut app, &rig.touch, 10, 10);
    assert_eq!(app.mode(), AppMode::Settings);
}

#[test]
fn setup_cancel_during_boot_restarts_setup() {
    let rig = Rig::new(None);
    let mut driver = Driver::new();
    let mut app = rig.app("");

    driver.boot(&mut app);
    driver.idle(&mut app, 100);
    driver.tap(&mut app, &rig.touch, 10, 10);
    assert_eq!(app.mode(), AppMode::WifiSetup);
    assert!(matches!(
        setup_state(&app),
        Some(SetupState::Scanning { .. } | SetupState::NetworkList)
    ));
}

#[test]
fn boot_button_opens_settings_and_waits_for_release() {
    let rig = Rig::new(Some(home_settings("secret")));
    let mut driver = Driver::new();
    let mut app = boot_to_clock(&rig, &mut driver);

    rig.touch.set(TouchSample::pressed_at(160, settings_row_y(0) + 5));
    rig.button.set(true);
    driver.step(&mut app, 20);
    assert_eq!(app.mode(), AppMode::Settings);
    assert_eq!(app.next_poll_delay_ms(driver.now), TOUCH_RELEASE_POLL_MS);

    driver.step(&mut app, 50);
    assert_eq!(app.mode(), AppMode::Settings);

    rig.touch.set(TouchSample::RELEASED);
    driver.step(&mut app, 50);
    assert_eq!(app.mode(), AppMode::Settings);
    assert_eq!(app.next_poll_delay_ms(driver.now), MODE_POLL_MS);
}

#[test]
fn brightness_and_rotation_apply_immediately_and_persist() {
    let rig = Rig::new(Some(home_settings("secret")));
    let mut driver = Driver::new();
    let mut app = boot_to_clock(&rig, &mut driver);

    driver.tap(&mut app, &rig.touch, 160, 120);
    driver.tap(&mut app, &rig.touch, SLIDER_BTN_X1 + 5, settings_row_y(3) + 5);
    assert_eq!(app.board().backlight, Some(239));
    assert_eq!(rig.stored().brightness, 239);

    let clears = app.board().clears;
    rig.touch.set(TouchSample::RELEASED);
    driver.step(&mut app, 250);
    rig.touch.set(TouchSample::pressed_at(280, settings_row_y(5) + 5));
    assert_eq!(driver.step(&mut app, 50), TickResult::RenderRequested);
    assert_eq!(app.board().rotated, Some(true));
    assert_eq!(app.board().clears, clears + 1);
    assert!(rig.stored().rotated);
}

#[test]
fn clock_poll_tightens_before_second_boundary() {
    let rig = Rig::new(Some(home_settings("secret")));
    let mut driver = Driver::new();
    let app = boot_to_clock(&rig, &mut driver);

    let base = Now::new(10_000, BOOT_UNIX_MS);
    assert_eq!(app.next_poll_delay_ms(base.advanced_by(100)), 20);
    assert_eq!(app.next_poll_delay_ms(base.advanced_by(950)), 10);
    assert_eq!(app.next_poll_delay_ms(base.advanced_by(990)), 2);
}

#[test]
fn unreadable_settings_boot_with_defaults() {
    let rig = Rig::new(Some(home_settings("secret")));
    let mut driver = Driver::new();
    let mut app = rig.app_with_store("secret", true);

    assert_eq!(app.settings(), &PersistedSettings::default());
    driver.boot(&mut app);
    assert_eq!(app.mode(), AppMode::WifiSetup);
}

#[test]
fn fallback_credentials_only_fill_an_empty_store() {
    let rig = Rig::new(None);
    let app = rig.app("").with_fallback_credentials("Lab", "pw");
    assert_eq!(app.settings().ssid.as_str(), "Lab");
    assert!(rig.stored.borrow().is_none());

    let rig = Rig::new(Some(home_settings("secret")));
    let app = rig.app("secret").with_fallback_credentials("Lab", "pw");
    assert_eq!(app.settings().ssid.as_str(), "HomeNet");
}

#[test]
fn view_follows_active_mode() {
    let rig = Rig::new(Some(home_settings("secret")));
    let mut driver = Driver::new();
    let mut app = rig.app("secret");

    let _ = app.tick(driver.now);
    assert!(app.with_view(|_, view| matches!(view, ScreenView::Splash)));

    driver.step(&mut app, 500);
    let ssid = app.with_view(|_, view| match view {
        ScreenView::Connecting { ssid } => Some(std::string::String::from(ssid)),
        _ => None,
    });
    assert_eq!(ssid.as_deref(), Some("HomeNet"));

    driver.step(&mut app, 50);
    let synced = app.with_view(|_, view| match view {
        ScreenView::Clock(face) => Some(face.synced),
        _ => None,
    });
    assert_eq!(synced, Some(false));
}

#[test]
fn about_and_ntp_back_return_to_settings() {
    let rig = Rig::new(Some(home_settings("secret")));
    let mut driver = Driver::new();
    let mut app = boot_to_clock(&rig, &mut driver);

    driver.tap(&mut app, &rig.touch, 160, 120);
    assert_eq!(app.mode(), AppMode::Settings);
    driver.tap(&mut app, &rig.touch, 100, settings_row_y(6) + 5);
    assert_eq!(app.mode(), AppMode::About);
    assert!(app.with_view(|_, view| matches!(view, ScreenView::About { .. })));

    driver.tap(&mut app, &rig.touch, 10, 10);
    assert_eq!(app.mode(), AppMode::Settings);

    driver.tap(&mut app, &rig.touch, 100, settings_row_y(2) + 5);
    assert_eq!(app.mode(), AppMode::NtpConfig);
    driver.tap(&mut app, &rig.touch, 10, 10);
    assert_eq!(app.mode(), AppMode::Settings);
    assert_eq!(rig.starts.borrow().len(), 1);
}

#[test]
fn timezone_back_keeps_current_zone() {
    let rig = Rig::new(Some(home_settings("secret")));
    let mut driver = Driver::new();
    let mut app = boot_to_clock(&rig, &mut driver);
    let before = app.local_time(driver.now);

    driver.tap(&mut app, &rig.touch, 160, 120);
    driver.tap(&mut app, &rig.touch, 100, settings_row_y(0) + 5);
    assert_eq!(app.mode(), AppMode::Timezone);

    driver.tap(&mut app, &rig.touch, 10, 10);
    assert_eq!(app.mode(), AppMode::Settings);
    assert_eq!(app.settings().timezone.as_str(), "UTC0");
    assert_eq!(rig.stored().timezone.as_str(), "UTC0");
    assert_eq!(app.local_time(driver.now).hour, before.hour);
}

#[test]
fn ntp_server_editor_cancel_restores_and_done_resyncs() {
    let rig = Rig::new(Some(home_settings("secret")));
    let mut driver = Driver::new();
    let mut app = boot_to_clock(&rig, &mut driver);
    rig.status.record_sync(BOOT_UNIX_MS / 1_000);
    let count = app.sync_stats(driver.now).sync_count;

    driver.tap(&mut app, &rig.touch, 160, 120);
    driver.tap(&mut app, &rig.touch, 100, settings_row_y(2) + 5);
    assert_eq!(ntp_server(&app), Some(("pool.ntp.org".into(), false)));

    let (key_x, key_y) = host_key_origin(3, 1, 9);
    driver.tap(&mut app, &rig.touch, 160, NTP_SERVER_BOX_Y + 5);
    driver.tap(&mut app, &rig.touch, key_x + 5, key_y + 5);
    assert_eq!(ntp_server(&app), Some(("pool.ntp.orgx".into(), true)));

    driver.tap(&mut app, &rig.touch, HOST_CANCEL_X + 5, HOST_BOTTOM_ROW_Y + 5);
    assert_eq!(ntp_server(&app), Some(("pool.ntp.org".into(), false)));
    assert_eq!(rig.starts.borrow().len(), 1);
    assert!(app.sync_stats(driver.now).synced);

    driver.tap(&mut app, &rig.touch, 160, NTP_SERVER_BOX_Y + 5);
    driver.tap(&mut app, &rig.touch, key_x + 5, key_y + 5);
    driver.tap(&mut app, &rig.touch, HOST_DONE_X + 5, HOST_BOTTOM_ROW_Y + 5);
    assert_eq!(app.mode(), AppMode::NtpConfig);
    assert_eq!(ntp_server(&app), Some(("pool.ntp.orgx".into(), false)));
    assert_eq!(rig.stored().ntp_server.as_str(), "pool.ntp.orgx");

    let stats = app.sync_stats(driver.now);
    assert_eq!(stats.server.as_str(), "pool.ntp.orgx");
    assert!(!stats.synced);
    assert_eq!(
        rig.starts.borrow().last(),
        Some(&("pool.ntp.orgx".into(), 86_400_000))
    );

    rig.status.record_sync(BOOT_UNIX_MS / 1_000 + 60);
    let stats = app.sync_stats(driver.now);
    assert!(stats.synced);
    assert_eq!(stats.sync_count, count + 1);
}

#[test]
fn fallback_credentials_stay_out_of_the_store() {
    let rig = Rig::new(None);
    let mut driver = Driver::new();
    let mut app = rig.app("pw").with_fallback_credentials("Lab", "pw");

    driver.boot(&mut app);
    assert_eq!(app.mode(), AppMode::Connecting);
    driver.step(&mut app, 50);
    assert_eq!(app.mode(), AppMode::Clock);

    driver.tap(&mut app, &rig.touch, 160, 120);
    driver.tap(&mut app, &rig.touch, SLIDER_BTN_X1 + 5, settings_row_y(3) + 5);

    let stored = rig.stored();
    assert_eq!(stored.brightness, 239);
    assert!(!stored.has_credentials());
    assert!(stored.password.is_empty());
    assert_eq!(app.settings().ssid.as_str(), "Lab");
}
