//! Countdown timers backed by embassy tasks
//!
//! Each control-layer timer is one [`TimerControl`] plus one
//! [`countdown_task`] instance. The control side flips the active flag
//! synchronously so the dispatch loop observes starts and stops
//! immediately; the task side sleeps and posts the expiry event into
//! the queue. The active flag is cleared before the expiry is posted,
//! so the handler may restart the timer straight away.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer as SleepTimer;
use portable_atomic::{AtomicBool, Ordering};

use velaria_cluster::Event;
use velaria_core::Timer;

use crate::channels::EVENT_CHANNEL;

#[derive(Debug, Clone, Copy)]
pub enum TimerCommand {
    Start,
    Stop,
}

/// Shared state between a [`QueueTimer`] handle and its countdown task
pub struct TimerControl {
    command: Signal<CriticalSectionRawMutex, TimerCommand>,
    active: AtomicBool,
}

impl TimerControl {
    pub const fn new() -> Self {
        Self {
            command: Signal::new(),
            active: AtomicBool::new(false),
        }
    }
}

/// Control-layer handle for one countdown task
pub struct QueueTimer {
    control: &'static TimerControl,
}

impl QueueTimer {
    pub fn new(control: &'static TimerControl) -> Self {
        Self { control }
    }
}

impl Timer for QueueTimer {
    fn start(&mut self) {
        self.control.active.store(true, Ordering::Relaxed);
        self.control.command.signal(TimerCommand::Start);
    }

    fn stop(&mut self) {
        self.control.active.store(false, Ordering::Relaxed);
        self.control.command.signal(TimerCommand::Stop);
    }

    fn is_active(&self) -> bool {
        self.control.active.load(Ordering::Relaxed)
    }
}

/// Single-shot countdown; a Start while counting restarts from zero
#[embassy_executor::task(pool_size = 5)]
pub async fn countdown_task(control: &'static TimerControl, timeout_ms: u64, expiry: Event) {
    loop {
        match control.command.wait().await {
            TimerCommand::Stop => continue,
            TimerCommand::Start => {}
        }

        loop {
            match select(control.command.wait(), SleepTimer::after_millis(timeout_ms)).await {
                // Restart the countdown from zero
                Either::First(TimerCommand::Start) => continue,
                Either::First(TimerCommand::Stop) => break,
                Either::Second(()) => {
                    // Clear before posting so the handler may restart us
                    control.active.store(false, Ordering::Relaxed);
                    EVENT_CHANNEL.send(expiry).await;
                    break;
                }
            }
        }
    }
}
