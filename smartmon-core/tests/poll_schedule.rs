//! Refresh loop timing with a slow device

use smartmon_core::start;
use smartmon_devkit::{RecordBuilder, StubProbe};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn slow_pass_defers_next_tick_without_catch_up_burst() {
    let probe = StubProbe::with_devices(&["/dev/sda"]);
    probe.push_record("/dev/sda", RecordBuilder::new("/dev/sda").temperature(30).build());
    probe.block("/dev/sda");
    let handle = start(probe.clone(), Duration::from_secs(10)).await.unwrap();

    // first pass stuck over three periods: no overlapping pass starts
    sleep(Duration::from_secs(35)).await;
    assert_eq!(probe.fetch_count("/dev/sda"), 1);
    assert_eq!(handle.stats().completed(), 0);

    probe.unblock("/dev/sda");
    sleep(Duration::from_millis(1)).await;
    // the overdue tick fires once, the missed ones are not replayed
    assert_eq!(probe.fetch_count("/dev/sda"), 2);
    assert_eq!(handle.stats().completed(), 2);

    // schedule restarts from the late tick: next pass at 45s, not 40s
    probe.clear_calls();
    sleep(Duration::from_secs(9)).await;
    assert!(probe.calls().is_empty());
    sleep(Duration::from_secs(2)).await;
    assert_eq!(probe.calls(), vec!["/dev/sda"]);
    assert_eq!(handle.stats().completed(), 3);
    assert_eq!(handle.stats().aborted(), 0);
}
