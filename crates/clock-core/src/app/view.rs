impl<'a, R, N, T, S, B> ModeController<'a, R, N, T, S, B>
where
    R: WifiRadio,
    N: SntpClient,
    T: TouchSource,
    S: SettingsStore,
    B: Board,
{
    /// Lend the board together with the active screen's view model.
    pub fn with_view<F, Out>(&mut self, f: F) -> Out
    where
        F: FnOnce(&mut B, ScreenView<'_>) -> Out,
    {
        let view = self.screen.view();
        f(&mut self.board, view)
    }
}
