//! Statistical check that tag verification doesn't leak a timing signal
//! big enough to matter (reference threshold: mean delta < 1 ms over at
//! least 5 runs, per the property this guards).

use std::time::{Duration, Instant};

use secchan::primitives::{hmac_sha256, random_bytes, verify_hmac_sha256};

const RUNS: usize = 200;

fn mean(durations: &[Duration]) -> Duration {
    durations.iter().sum::<Duration>() / durations.len() as u32
}

#[test]
fn hmac_verification_timing_is_not_distinguishable_by_failure_position() {
    let key = random_bytes(32);
    let data = random_bytes(4096);
    let tag = hmac_sha256(&key, &data);

    let mut early_mismatch = tag;
    early_mismatch[0] ^= 0xFF;

    let mut late_mismatch = tag;
    late_mismatch[31] ^= 0xFF;

    let mut early_times = Vec::with_capacity(RUNS);
    let mut late_times = Vec::with_capacity(RUNS);

    for _ in 0..RUNS {
        let start = Instant::now();
        let _ = verify_hmac_sha256(&key, &data, &early_mismatch);
        early_times.push(start.elapsed());

        let start = Instant::now();
        let _ = verify_hmac_sha256(&key, &data, &late_mismatch);
        late_times.push(start.elapsed());
    }

    let early_mean = mean(&early_times);
    let late_mean = mean(&late_times);
    let delta = if early_mean > late_mean {
        early_mean - late_mean
    } else {
        late_mean - early_mean
    };

    assert!(
        delta < Duration::from_millis(1),
        "mean verification time differed by {delta:?} depending on where the tag diverged"
    );
}
