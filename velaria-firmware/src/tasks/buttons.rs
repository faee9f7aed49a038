//! Button input tasks
//!
//! One task per physical button. Edges are debounced here; all chord
//! and long-press interpretation happens in the dispatch loop where
//! both buttons are visible together.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Timer;

use velaria_core::{Button, ButtonId};

use crate::channels::ChannelSink;

/// Settle time after an edge before the level is trusted
const DEBOUNCE_MS: u64 = 20;

/// Watch one active-low button and post its debounced edges
#[embassy_executor::task(pool_size = 2)]
pub async fn button_task(mut input: Input<'static>, id: ButtonId) {
    info!("button task started: {}", id);

    let button = Button::new(id);
    let sink = ChannelSink;

    loop {
        input.wait_for_low().await;
        Timer::after_millis(DEBOUNCE_MS).await;
        if input.is_high() {
            // Bounce, not a press
            continue;
        }
        button.press(&sink);

        loop {
            input.wait_for_high().await;
            Timer::after_millis(DEBOUNCE_MS).await;
            if input.is_high() {
                button.release(&sink);
                break;
            }
        }
    }
}
