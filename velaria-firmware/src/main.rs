//! Velaria - Motorized Window Covering Firmware
//!
//! Firmware binary for RP2040-based window covering controllers.
//! All inputs (buttons, timers, attribute-change notifications,
//! connectivity polling) funnel into one event queue drained by the
//! dispatch loop in this task.
//!
//! Named after the velarium, the retractable awning system of Roman
//! amphitheatres.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Input, Pull};
use embassy_time::{Duration, Ticker};
use {defmt_rtt as _, panic_probe as _};

use velaria_cluster::store::{NotifyingStore, RamAttributeStore};
use velaria_cluster::{Attribute, AttributeStore, EndpointId, Event, EventKind, Features};
use velaria_core::storage::{load_cover_config, save_cover_config, StorageError};
use velaria_core::{
    ButtonId, Controller, Cover, CoverConfig, RamKeyValueStore, SideEffect, ACTUATOR_TICK_MS,
    LONG_PRESS_TIMEOUT_MS,
};

use crate::channels::{ChannelSink, EVENT_CHANNEL, NET_STATE};
use crate::timers::{countdown_task, QueueTimer, TimerControl};

mod channels;
mod tasks;
mod timers;

/// Endpoints of the two managed coverings
const ENDPOINTS: [EndpointId; 2] = [1, 2];

/// Poll interval for the connectivity snapshot
const NET_POLL_MS: u64 = 500;

// Timer state shared between the dispatch loop and the countdown tasks
static LONG_PRESS_TIMER: TimerControl = TimerControl::new();
static LIFT_TIMERS: [TimerControl; 2] = [TimerControl::new(), TimerControl::new()];
static TILT_TIMERS: [TimerControl; 2] = [TimerControl::new(), TimerControl::new()];

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Velaria firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Buttons (active low, board pulls the lines up)
    let up = Input::new(p.PIN_12, Pull::Up);
    let down = Input::new(p.PIN_13, Pull::Up);
    spawner.spawn(tasks::button_task(up, ButtonId::Up)).unwrap();
    spawner
        .spawn(tasks::button_task(down, ButtonId::Down))
        .unwrap();

    // One countdown task per control-layer timer
    spawner
        .spawn(countdown_task(
            &LONG_PRESS_TIMER,
            LONG_PRESS_TIMEOUT_MS,
            Event::new(EventKind::LongPressTimeout),
        ))
        .unwrap();
    for (index, &endpoint) in ENDPOINTS.iter().enumerate() {
        spawner
            .spawn(countdown_task(
                &LIFT_TIMERS[index],
                ACTUATOR_TICK_MS,
                Event::for_endpoint(EventKind::LiftTimerExpired, endpoint),
            ))
            .unwrap();
        spawner
            .spawn(countdown_task(
                &TILT_TIMERS[index],
                ACTUATOR_TICK_MS,
                Event::for_endpoint(EventKind::TiltTimerExpired, endpoint),
            ))
            .unwrap();
    }

    spawner.spawn(tasks::net_task()).unwrap();

    // Attribute storage with the capabilities of this product
    let mut store = RamAttributeStore::new(ENDPOINTS);
    let features = Features::LIFT
        .union(Features::TILT)
        .union(Features::POSITION_AWARE)
        .union(Features::ABSOLUTE);
    for endpoint in ENDPOINTS {
        store
            .set(endpoint, Attribute::FeatureMap, features.bits())
            .unwrap();
    }

    // Persisted configuration store. Volatile until the board gains a
    // flash-backed implementation of the same trait.
    let mut kvs: RamKeyValueStore = RamKeyValueStore::new();

    let mut controller = Controller::new(QueueTimer::new(&LONG_PRESS_TIMER));
    for (index, &endpoint) in ENDPOINTS.iter().enumerate() {
        let config = load_or_default_config(&mut kvs, endpoint);
        let mut cover = Cover::new(
            endpoint,
            &config,
            QueueTimer::new(&LIFT_TIMERS[index]),
            QueueTimer::new(&TILT_TIMERS[index]),
        );
        if let Err(error) = cover.init(&mut store) {
            error!("Ep[{=u16}] init failed: {}", endpoint, error);
        }
        if controller.add_cover(cover).is_err() {
            error!("no cover slot left for Ep[{=u16}]", endpoint);
        }
    }
    info!("Covers initialized, dispatch loop running");

    let sink = ChannelSink;
    let mut net_ticker = Ticker::every(Duration::from_millis(NET_POLL_MS));

    loop {
        match select(EVENT_CHANNEL.receive(), net_ticker.next()).await {
            Either::First(event) => {
                // Attribute writes made while dispatching feed back
                // into the queue as change notifications
                let mut notifying = NotifyingStore::new(&mut store, &sink);
                match controller.dispatch(event, &mut notifying, &sink) {
                    Some(SideEffect::FactoryReset) => {
                        warn!("factory reset: wiping persisted state");
                        kvs.clear();
                        controller.finish();
                        cortex_m::peripheral::SCB::sys_reset();
                    }
                    None => {}
                }
            }
            Either::Second(()) => {
                // Non-blocking: skip the poll when the network task
                // holds the lock, reusing last tick's snapshot
                if let Ok(state) = NET_STATE.try_lock() {
                    controller.update_connectivity(*state, &sink);
                }
            }
        }
    }
}

/// Load a covering's persisted motion parameters, seeding the store
/// with defaults on first boot
fn load_or_default_config(kvs: &mut RamKeyValueStore, endpoint: EndpointId) -> CoverConfig {
    match load_cover_config(kvs, endpoint) {
        Ok(config) => {
            info!("Ep[{=u16}] configuration loaded", endpoint);
            config
        }
        Err(StorageError::NotFound) => {
            let config = CoverConfig::default();
            if let Err(error) = save_cover_config(kvs, endpoint, &config) {
                warn!("Ep[{=u16}] default config not saved: {}", endpoint, error);
            }
            config
        }
        Err(error) => {
            warn!("Ep[{=u16}] config load failed: {}, using defaults", endpoint, error);
            CoverConfig::default()
        }
    }
}
