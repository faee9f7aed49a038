//! Network state task
//!
//! Stand-in for the commissioning/network stack: owns the shared
//! connectivity snapshot and updates it as the (simulated) stack comes
//! up. The main loop polls the snapshot with a non-blocking lock
//! attempt and diffs it into events.

use defmt::*;
use embassy_time::Timer;

use crate::channels::NET_STATE;

/// Time until the simulated stack reports itself provisioned
const PROVISION_DELAY_SECS: u64 = 10;

#[embassy_executor::task]
pub async fn net_task() {
    info!("net task started");

    Timer::after_secs(PROVISION_DELAY_SECS).await;
    {
        let mut state = NET_STATE.lock().await;
        state.provisioned = true;
        state.service_reachable = true;
    }
    info!("network provisioned");
}
