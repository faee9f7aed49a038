//! Inter-task communication channels
//!
//! Every input source posts into the single EVENT_CHANNEL; the main
//! loop is its only consumer. Producers never block: the sink drops an
//! event (with a log) when the queue is full rather than stalling an
//! interrupt-adjacent task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;

use velaria_cluster::{Event, EventSink};
use velaria_core::StateFlags;

/// Queued events awaiting the dispatch loop
const EVENT_CHANNEL_SIZE: usize = 16;

/// The single-consumer event queue
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Event, EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Connectivity snapshot owned by the network task; the main loop
/// polls it with a non-blocking lock attempt
pub static NET_STATE: Mutex<CriticalSectionRawMutex, StateFlags> = Mutex::new(StateFlags {
    provisioned: false,
    ble_connections: false,
    service_reachable: false,
});

/// [`EventSink`] backed by [`EVENT_CHANNEL`]
pub struct ChannelSink;

impl EventSink for ChannelSink {
    fn post(&self, event: Event) {
        if EVENT_CHANNEL.try_send(event).is_err() {
            defmt::warn!("event queue full, dropping {}", event);
        }
    }
}
