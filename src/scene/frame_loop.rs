/// Handle for one requested frame. Only the most recent request is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// The display's vertical refresh. Callers request one callback at a time and
/// may cancel it before it fires.
pub trait RefreshDriver {
    fn request_frame(&mut self) -> FrameToken;
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Deterministic driver for tests and offline rendering: frames fire only when
/// the host calls [`ManualRefreshDriver::next_due`].
#[derive(Debug, Default)]
pub struct ManualRefreshDriver {
    next_token: u64,
    requested: Option<FrameToken>,
    cancelled: usize,
}

impl ManualRefreshDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_due(&mut self) -> Option<FrameToken> {
        self.requested.take()
    }

    pub fn is_pending(&self) -> bool {
        self.requested.is_some()
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl RefreshDriver for ManualRefreshDriver {
    fn request_frame(&mut self) -> FrameToken {
        self.next_token += 1;
        let token = FrameToken(self.next_token);
        self.requested = Some(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.requested == Some(token) {
            self.requested = None;
            self.cancelled += 1;
        }
    }
}

pub struct FrameLoop {
    driver: Box<dyn RefreshDriver>,
    pending: Option<FrameToken>,
}

impl FrameLoop {
    pub fn new(driver: Box<dyn RefreshDriver>) -> Self {
        Self {
            driver,
            pending: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    pub fn request(&mut self) -> FrameToken {
        let token = self.driver.request_frame();
        self.pending = Some(token);
        token
    }

    pub fn accept(&mut self, token: FrameToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            self.driver.cancel_frame(token);
        }
    }
}
