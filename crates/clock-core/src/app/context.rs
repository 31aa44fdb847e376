/// Disjoint borrows of the controller handed to the active screen.
struct SessionContext<'c, 'a, R, N, S, B>
where
    R: WifiRadio,
    N: SntpClient,
    S: SettingsStore,
    B: Board,
{
    connection: &'c mut ConnectionManager<'a, R>,
    sync: &'c mut TimeSyncManager<'a, N>,
    store: &'c mut S,
    board: &'c mut B,
    settings: &'c mut PersistedSettings,
    fallback_credentials: bool,
    timezone: &'c TimeZone,
    clear_pending: &'c mut bool,
}

/// Save `settings`, blanking the credentials when they are build-time
/// fallbacks.
fn persist<S: SettingsStore>(
    store: &mut S,
    settings: &PersistedSettings,
    fallback_credentials: bool,
) {
    let result = if fallback_credentials {
        let mut stored = settings.clone();
        stored.set_credentials("", "");
        store.save(&stored)
    } else {
        store.save(settings)
    };
    match result {
        Ok(()) => debug!("settings: saved"),
        Err(err) => warn!("settings: save failed: {:?}", err),
    }
}

impl<R, N, S, B> ScreenContext for SessionContext<'_, '_, R, N, S, B>
where
    R: WifiRadio,
    N: SntpClient,
    S: SettingsStore,
    B: Board,
{
    fn begin_scan(&mut self, now_ms: u64) {
        self.connection.begin_scan(now_ms);
    }

    fn poll_scan(&mut self, now_ms: u64) -> Option<Vec<Network, MAX_SCAN_RESULTS>> {
        self.connection.poll_scan(now_ms)
    }

    fn begin_connect(&mut self, ssid: &str, password: &str, now_ms: u64) {
        self.connection.begin_connect(ssid, password, now_ms);
    }

    fn poll_connect(&mut self, now_ms: u64) -> ConnectPoll {
        self.connection.poll_connect(now_ms)
    }

    fn sync_stats(&self, now_ms: u64) -> SyncStats {
        self.sync.stats(now_ms)
    }

    fn sync_interval_secs(&self) -> u32 {
        self.sync.interval_secs()
    }

    fn set_sync_interval(&mut self, secs: u32, now_ms: u64) {
        self.sync.set_interval(secs, now_ms);
    }

    fn set_sync_server(&mut self, server: &str) {
        self.sync.set_server(server);
    }

    fn force_sync(&mut self, now_ms: u64) {
        self.sync.force_sync(now_ms);
    }

    fn settings(&self) -> &PersistedSettings {
        &*self.settings
    }

    fn update_settings(&mut self, apply: impl FnOnce(&mut PersistedSettings)) {
        apply(&mut *self.settings);
        persist(&mut *self.store, &*self.settings, self.fallback_credentials);
    }

    fn local_time(&self, unix_secs: i64) -> LocalTime {
        self.timezone.to_local(unix_secs)
    }

    fn set_backlight(&mut self, level: u8) {
        self.board.set_backlight(level);
    }

    fn set_indicator(&mut self, level: u8) {
        self.board.set_indicator(level);
    }

    fn set_rotation(&mut self, rotated: bool) {
        self.board.set_rotation(rotated);
    }

    fn settings_button_pressed(&mut self) -> bool {
        self.board.settings_button_pressed()
    }

    fn request_clear(&mut self) {
        *self.clear_pending = true;
    }
}
