impl<'a, R, N, T, S, B> ModeController<'a, R, N, T, S, B>
where
    R: WifiRadio,
    N: SntpClient,
    T: TouchSource,
    S: SettingsStore,
    B: Board,
{
    pub fn new(
        connection: ConnectionManager<'a, R>,
        sync: TimeSyncManager<'a, N>,
        touch: T,
        mut store: S,
        board: B,
    ) -> Self {
        let settings = match store.load() {
            Ok(Some(settings)) => {
                info!("settings: loaded stored settings");
                settings.normalized()
            }
            Ok(None) => {
                info!("settings: nothing stored, using defaults");
                PersistedSettings::default()
            }
            Err(err) => {
                warn!("settings: load failed, using defaults: {:?}", err);
                PersistedSettings::default()
            }
        };
        let timezone = TimeZone::from_posix_or_utc(settings.timezone.as_str());

        Self {
            connection,
            sync,
            touch,
            store,
            board,
            settings,
            fallback_credentials: false,
            timezone,
            mode: AppMode::Init,
            screen: ActiveScreen::Splash,
            return_target: ReturnTarget::Boot,
            release_gate: ReleaseGate::new(),
            ntp_started: false,
            boot_at_ms: None,
            clear_pending: false,
            pending_redraw: false,
        }
    }

    /// Credentials to try when none are stored. They never reach the store;
    /// saves write empty credentials until the setup screen connects.
    pub fn with_fallback_credentials(mut self, ssid: &str, password: &str) -> Self {
        if !self.settings.has_credentials() && !ssid.is_empty() {
            info!("settings: using build-time credentials for {}", ssid);
            self.settings.set_credentials(ssid, password);
            self.fallback_credentials = true;
        }
        self
    }

    pub fn tick(&mut self, now: Now) -> TickResult {
        self.connection.service();

        if self.mode == AppMode::Init {
            return self.tick_boot(now);
        }

        let sample = match self.touch.poll() {
            Ok(sample) => sample,
            Err(err) => {
                debug!("touch: poll failed: {:?}", err);
                TouchSample::RELEASED
            }
        };

        if self.release_gate.hold(sample) {
            return self.take_render();
        }

        let result = {
            let (screen, mut ctx) = self.split();
            screen.update(&mut ctx, sample, now)
        };
        self.apply(result, now);
        self.take_render()
    }

    /// Delay before the next [`Self::tick`].
    pub fn next_poll_delay_ms(&self, now: Now) -> u32 {
        if self.release_gate.is_armed() {
            TOUCH_RELEASE_POLL_MS
        } else if self.mode == AppMode::Clock {
            clock_poll_delay_ms(now.ms_into_second())
        } else {
            MODE_POLL_MS
        }
    }

    pub const fn mode(&self) -> AppMode {
        self.mode
    }

    pub const fn return_target(&self) -> ReturnTarget {
        self.return_target
    }

    pub const fn settings(&self) -> &PersistedSettings {
        &self.settings
    }

    pub const fn is_sync_started(&self) -> bool {
        self.ntp_started
    }

    pub const fn connection_state(&self) -> ConnectionState {
        self.connection.snapshot()
    }

    pub fn sync_stats(&self, now: Now) -> SyncStats {
        self.sync.stats(now.monotonic_ms)
    }

    pub fn local_time(&self, now: Now) -> LocalTime {
        self.timezone.to_local(now.unix_secs())
    }

    pub const fn board(&self) -> &B {
        &self.board
    }

    pub const fn screen(&self) -> &ActiveScreen {
        &self.screen
    }

    fn tick_boot(&mut self, now: Now) -> TickResult {
        match self.boot_at_ms {
            None => {
                info!("boot: starting");
                self.boot_at_ms = Some(now.monotonic_ms + SPLASH_HOLD_MS);
                self.board.set_rotation(self.settings.rotated);
                self.board.set_backlight(self.settings.brightness);
                self.board.set_indicator(0);
                self.board.clear_screen();
                self.pending_redraw = true;
                return self.take_render();
            }
            Some(at) if now.monotonic_ms < at => return TickResult::NoRender,
            Some(_) => {}
        }

        if self.settings.has_credentials() {
            self.enter(AppMode::Connecting, now);
        } else {
            info!("boot: no stored credentials");
            self.return_target = ReturnTarget::Boot;
            self.enter(AppMode::WifiSetup, now);
        }
        self.take_render()
    }

    fn apply(&mut self, result: ModeResult, now: Now) {
        match (self.mode, result) {
            (_, ModeResult::Continue) => {}
            (AppMode::Connecting, ModeResult::Connected) => {
                self.start_sync_once(now);
                self.enter(AppMode::Clock, now);
            }
            (AppMode::Connecting, ModeResult::ConnectFailed) => {
                warn!("boot: stored credentials did not connect");
                self.return_target = ReturnTarget::Boot;
                self.enter(AppMode::WifiSetup, now);
            }
            (AppMode::WifiSetup, ModeResult::Connected) => {
                self.save_credentials();
                self.start_sync_once(now);
                self.enter(AppMode::Clock, now);
            }
            (AppMode::WifiSetup, ModeResult::Cancelled) => match self.return_target {
                ReturnTarget::Settings => self.enter(AppMode::Settings, now),
                ReturnTarget::Boot => self.enter(AppMode::WifiSetup, now),
            },
            (AppMode::Clock, ModeResult::OpenSettings) => {
                self.enter(AppMode::Settings, now);
                self.release_gate.arm();
            }
            (AppMode::Settings, ModeResult::OpenTimezone) => self.enter(AppMode::Timezone, now),
            (AppMode::Settings, ModeResult::OpenWifi) => {
                self.return_target = ReturnTarget::Settings;
                self.enter(AppMode::WifiSetup, now);
            }
            (AppMode::Settings, ModeResult::OpenNtp) => self.enter(AppMode::NtpConfig, now),
            (AppMode::Settings, ModeResult::OpenAbout) => self.enter(AppMode::About, now),
            (AppMode::Settings, ModeResult::Done) => self.enter(AppMode::Clock, now),
            (AppMode::Timezone, ModeResult::TimezoneSelected) => {
                self.save_timezone();
                self.enter(AppMode::Settings, now);
            }
            (AppMode::Timezone, ModeResult::Cancelled)
            | (AppMode::About, ModeResult::Back)
            | (AppMode::NtpConfig, ModeResult::Back) => self.enter(AppMode::Settings, now),
            (AppMode::NtpConfig, ModeResult::Synced) => self.enter(AppMode::Clock, now),
            (mode, result) => debug!("mode: ignoring {:?} in {:?}", result, mode),
        }
    }

    fn enter(&mut self, mode: AppMode, now: Now) {
        info!("mode: {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.screen = match mode {
            AppMode::Init => ActiveScreen::Splash,
            AppMode::WifiSetup => ActiveScreen::Setup(SetupScreen::new()),
            AppMode::Connecting => ActiveScreen::Connecting(ConnectingScreen::new()),
            AppMode::Clock => ActiveScreen::Clock(ClockScreen::new()),
            AppMode::Settings => ActiveScreen::Settings(SettingsScreen::new()),
            AppMode::Timezone => ActiveScreen::Timezone(TimezoneScreen::new()),
            AppMode::About => ActiveScreen::About(AboutScreen::new()),
            AppMode::NtpConfig => ActiveScreen::Ntp(NtpScreen::new()),
        };
        self.board.clear_screen();
        self.pending_redraw = true;

        let (screen, mut ctx) = self.split();
        screen.init(&mut ctx, now);
    }

    fn start_sync_once(&mut self, now: Now) {
        if self.ntp_started {
            return;
        }
        self.sync.start(
            self.settings.ntp_server.as_str(),
            self.settings.ntp_interval_secs,
            now.monotonic_ms,
        );
        self.ntp_started = true;
    }

    fn save_credentials(&mut self) {
        let ActiveScreen::Setup(screen) = &self.screen else {
            return;
        };
        let Some((ssid, password)) = screen.credentials() else {
            return;
        };
        info!("settings: saving credentials for {}", ssid);
        self.settings.set_credentials(ssid, password);
        self.fallback_credentials = false;
        persist(&mut self.store, &self.settings, false);
    }

    fn save_timezone(&mut self) {
        let ActiveScreen::Timezone(screen) = &self.screen else {
            return;
        };
        let zone = screen.selected();
        info!("timezone: now {} ({})", zone.name, zone.posix);
        self.settings.set_timezone(zone.posix);
        self.timezone = TimeZone::from_posix_or_utc(zone.posix);
        persist(&mut self.store, &self.settings, self.fallback_credentials);
    }

    fn take_render(&mut self) -> TickResult {
        if core::mem::take(&mut self.clear_pending) {
            self.board.clear_screen();
            self.pending_redraw = true;
        }
        let screen_dirty = self.screen.take_redraw();
        if core::mem::take(&mut self.pending_redraw) || screen_dirty {
            TickResult::RenderRequested
        } else {
            TickResult::NoRender
        }
    }

    fn split(&mut self) -> (&mut ActiveScreen, SessionContext<'_, 'a, R, N, S, B>) {
        (
            &mut self.screen,
            SessionContext {
                connection: &mut self.connection,
                sync: &mut self.sync,
                store: &mut self.store,
                board: &mut self.board,
                settings: &mut self.settings,
                fallback_credentials: self.fallback_credentials,
                timezone: &self.timezone,
                clear_pending: &mut self.clear_pending,
            },
        )
    }
}
