use super::*;


/// A [`RandSource`] that yields prepared digits, then zeros.
#[derive(Debug)]
pub(super) struct PreparedDigits(pub Vec<u8>);

impl RandSource for PreparedDigits {
    fn next_u32(&mut self) -> u32 {
        let digit = if self.0.is_empty() { 0 } else { self.0.remove(0) };
        u32::from(digit) << 26
    }
}

/// A seeded [`RandSource`] so failures can be reproduced.
#[derive(Debug)]
pub(super) struct SeededRandSource(rand09::rngs::StdRng);

impl SeededRandSource {
    pub fn new(seed: u64) -> Self {
        use rand09::SeedableRng as _;
        Self(rand09::rngs::StdRng::seed_from_u64(seed))
    }
}

impl RandSource for SeededRandSource {
    fn next_u32(&mut self) -> u32 {
        use rand09::RngCore as _;
        self.0.next_u32()
    }

    fn label(&self) -> String {
        String::from("seeded")
    }
}

fn seeded_generator() -> PushIdGenerator<SeededRandSource> {
    PushIdGenerator::with_rand_and_time_sources(SeededRandSource::new(0x0123_4567), StdSystemTime)
}

/// Generates IDs of fixed length consisting of alphabet digits only
#[test]
fn generates_ids_of_fixed_length_consisting_of_alphabet_digits_only() {
    use regex::Regex;

    let cases = [
        (seeded_generator(), r"^[-0-9A-Z_a-z]{14}$"),
        (
            PushIdGenerator::try_with_retention(
                SeededRandSource::new(1),
                StdSystemTime,
                Duration::from_secs(3600),
            )
            .unwrap(),
            r"^[-0-9A-Z_a-z]{10}$",
        ),
        (
            PushIdGenerator::try_with_retention(
                SeededRandSource::new(2),
                StdSystemTime,
                Duration::from_secs(86400 * 365),
            )
            .unwrap(),
            r"^[-0-9A-Z_a-z]{12}$",
        ),
    ];

    for (g, pattern) in cases {
        let re = Regex::new(pattern).unwrap();
        for _ in 0..10_000 {
            let e = g.generate();
            assert_eq!(e.len(), g.len());
            assert_eq!(e.timestamp_digits(), g.timestamp_digits());
            assert!(re.is_match(e.as_str()));
        }
    }
}

/// Encodes prepared entropy and timestamp into expected string
#[test]
fn encodes_prepared_entropy_and_timestamp_into_expected_string() {
    let g = PushIdGenerator::with_rand_and_time_sources(
        PreparedDigits(vec![1, 2, 3, 4, 5, 6]),
        StdSystemTime,
    );

    let x = g.generate_with_ts(1_700_000_000_000);
    assert_eq!(x.as_str(), "-NjEtLV-543210");
    assert_eq!(x.timestamp(), 1_700_000_000_000);

    let y = g.generate_with_ts(1_700_000_000_000);
    assert_eq!(y.as_str(), "-NjEtLV-543211");

    // entropy is carried over as is to a new timestamp
    let z = g.generate_with_ts(1_700_000_000_001);
    assert_eq!(z.as_str(), "-NjEtLV0543211");
}

/// Generates two back-to-back IDs in ascending order
#[test]
fn generates_two_back_to_back_ids_in_ascending_order() {
    let g = seeded_generator();
    assert_eq!(g.timestamp_digits(), 8);
    assert_eq!(g.len(), 14);
    assert_eq!(g.retention(), None);

    let (a, b) = (g.generate(), g.generate());
    assert_eq!(a.len(), 14);
    assert_eq!(b.len(), 14);
    assert_ne!(a, b);
    assert!(a < b);
    assert!(a.as_str() < b.as_str());
}

/// Encodes up-to-date timestamp
#[test]
fn encodes_up_to_date_timestamp() {
    let g = seeded_generator();
    for _ in 0..10_000 {
        let ts_now = StdSystemTime.unix_ts_ms() as i64;
        let timestamp = g.generate().timestamp() as i64;
        assert!((ts_now - timestamp).abs() < 16);
    }
}

/// Generates unique ascending IDs in lock acquisition order under multithreading
#[test]
fn generates_unique_ascending_ids_in_lock_acquisition_order_under_multithreading() {
    use std::sync::Arc;
    use std::thread;

    const N_THREADS: usize = 4;
    const N_LOOPS: usize = 1_000_000;

    let g = Arc::new(seeded_generator());
    let handles: Vec<_> = (0..N_THREADS)
        .map(|_| {
            let g = Arc::clone(&g);
            thread::spawn(move || {
                let mut ids = Vec::with_capacity(N_LOOPS);
                for _ in 0..N_LOOPS {
                    let curr = g.generate();
                    if let Some(prev) = ids.last() {
                        assert!(prev < &curr);
                    }
                    ids.push(curr);
                }
                ids
            })
        })
        .collect();

    let mut all = Vec::with_capacity(N_THREADS * N_LOOPS);
    for h in handles {
        all.extend(h.join().unwrap());
    }
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), N_THREADS * N_LOOPS);
}

/// Returns sorted sequence when collected in generation order
#[test]
fn returns_sorted_sequence_when_collected_in_generation_order() {
    use std::sync::{Arc, Mutex};
    use std::thread;

    const N_THREADS: usize = 4;
    const N_LOOPS: usize = 100_000;

    let g = Arc::new(seeded_generator());
    let recorded = Arc::new(Mutex::new(Vec::with_capacity(N_THREADS * N_LOOPS)));
    let handles: Vec<_> = (0..N_THREADS)
        .map(|_| {
            let g = Arc::clone(&g);
            let recorded = Arc::clone(&recorded);
            thread::spawn(move || {
                for _ in 0..N_LOOPS {
                    // record each ID in the same critical section that produced it
                    let mut recorded = recorded.lock().unwrap();
                    recorded.push(g.generate());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let in_order = Arc::try_unwrap(recorded).unwrap().into_inner().unwrap();
    let mut sorted = in_order.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted, in_order);
}

/// Is iterable with for-in loop
#[test]
fn is_iterable_with_for_in_loop() {
    let g = seeded_generator();
    let mut i = 0;
    let mut prev = None;
    for e in &g {
        assert!(prev < Some(e));
        prev = Some(e);
        i += 1;
        if i > 100 {
            break;
        }
    }
    assert_eq!(i, 101);
}

/// Reports label of random number generator
#[test]
fn reports_label_of_random_number_generator() {
    assert_eq!(seeded_generator().debug_label(), "seeded");

    let g = PushIdGenerator::with_rand_and_time_sources(PreparedDigits(vec![]), StdSystemTime);
    assert_eq!(g.debug_label(), "");

    #[cfg(feature = "default_rng")]
    {
        let g = PushIdGenerator::with_rand_and_time_sources(
            DefaultRng::with_seed(1_700_000_000_000_000_000),
            StdSystemTime,
        );
        assert_eq!(g.debug_label(), "1700000000000000000");

        let g = PushIdGenerator::new();
        assert!(g.debug_label().parse::<u64>().is_ok());
    }
}

/// Draws the same initial entropy from the same seed
#[cfg(feature = "default_rng")]
#[test]
fn draws_the_same_initial_entropy_from_the_same_seed() {
    let seed = 0x0123_4567_89ab_cdef;
    let a = PushIdGenerator::with_rand_and_time_sources(DefaultRng::with_seed(seed), StdSystemTime);
    let b = PushIdGenerator::with_rand_and_time_sources(DefaultRng::with_seed(seed), StdSystemTime);
    assert_eq!(
        a.generate_with_ts(1_700_000_000_000),
        b.generate_with_ts(1_700_000_000_000)
    );
}
