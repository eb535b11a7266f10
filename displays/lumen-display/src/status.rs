//! Session status model
//!
//! The data a session monitor reports, plus the fixed-capacity text
//! formatting used by the status screen.

use core::fmt::Write;
use heapless::String;

/// Longest line the status screen formats
pub const LINE_LEN: usize = 24;

/// Formatted status line
pub type Line = String<LINE_LEN>;

/// Wall-clock time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Clock {
    pub hours: u8,
    pub minutes: u8,
}

impl Clock {
    /// Clock from seconds since midnight (wraps at 24 h)
    pub const fn from_secs(secs: u32) -> Self {
        let secs = secs % 86_400;
        Self {
            hours: (secs / 3600) as u8,
            minutes: ((secs % 3600) / 60) as u8,
        }
    }
}

/// Snapshot of a monitored session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionStatus {
    /// Time since the session started
    pub elapsed_secs: u32,
    /// Accumulated cost in cents
    pub cost_cents: u32,
    /// Tokens used so far
    pub tokens: u32,
    /// Session is actively working (vs idle)
    pub active: bool,
    /// Unacknowledged alerts
    pub alerts: u8,
    /// Wall clock, when known
    pub clock: Option<Clock>,
}

impl SessionStatus {
    pub fn has_alert(&self) -> bool {
        self.alerts > 0
    }

    /// Drop pending alerts
    pub fn acknowledge(&mut self) {
        self.alerts = 0;
    }

    /// Share of `limit_secs` used, in percent (0..=100)
    pub fn progress_percent(&self, limit_secs: u32) -> u8 {
        if limit_secs == 0 {
            return 100;
        }
        let pct = self.elapsed_secs as u64 * 100 / limit_secs as u64;
        pct.min(100) as u8
    }
}

// Writes into a `Line` only fail on overflow, which leaves the prefix; the
// formats below all fit.

/// `HH:MM`, or `--:--` without a clock
pub fn format_clock(clock: Option<Clock>) -> Line {
    let mut s = Line::new();
    match clock {
        Some(c) => {
            let _ = write!(s, "{:02}:{:02}", c.hours, c.minutes);
        }
        None => {
            let _ = s.push_str("--:--");
        }
    }
    s
}

/// `SESSION: 01H02M03S`
pub fn format_session(elapsed_secs: u32) -> Line {
    let hours = elapsed_secs / 3600;
    let minutes = (elapsed_secs % 3600) / 60;
    let seconds = elapsed_secs % 60;
    let mut s = Line::new();
    let _ = write!(s, "SESSION: {:02}H{:02}M{:02}S", hours, minutes, seconds);
    s
}

/// `COST: $12.34`
pub fn format_cost(cents: u32) -> Line {
    let mut s = Line::new();
    let _ = write!(s, "COST: ${}.{:02}", cents / 100, cents % 100);
    s
}

/// `TOKENS: 1,234,567`
pub fn format_tokens(tokens: u32) -> Line {
    let mut digits = [0u8; 10];
    let mut n = tokens;
    let mut len = 0;
    loop {
        digits[len] = b'0' + (n % 10) as u8;
        len += 1;
        n /= 10;
        if n == 0 {
            break;
        }
    }

    let mut s = Line::new();
    let _ = s.push_str("TOKENS: ");
    for i in (0..len).rev() {
        let _ = s.push(digits[i] as char);
        if i > 0 && i % 3 == 0 {
            let _ = s.push(',');
        }
    }
    s
}

/// `ALERTS: 2`, or `ALERTS: NONE`
pub fn format_alerts(alerts: u8) -> Line {
    let mut s = Line::new();
    if alerts == 0 {
        let _ = s.push_str("ALERTS: NONE");
    } else {
        let _ = write!(s, "ALERTS: {}", alerts);
    }
    s
}
