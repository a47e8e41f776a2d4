#![cfg(feature = "global_gen")]

use crate::{PushId, PushIdGenerator};
use std::sync::OnceLock;

/// Returns the process-wide generator, creating it on first use.
fn global() -> &'static PushIdGenerator {
    static G: OnceLock<PushIdGenerator> = OnceLock::new();

    G.get_or_init(|| {
        let g = PushIdGenerator::new();
        #[cfg(feature = "log")]
        log::debug!("pushid: initialized global generator ({})", g.debug_label());
        g
    })
}

/// Generates a new push-style ID object using the global generator.
///
/// This function is thread-safe; multiple threads in a process can call it concurrently without
/// breaking the monotonic order of generated IDs.
#[cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]
pub fn new() -> PushId {
    global().generate()
}

/// Generates a new push-style ID encoded in the 14-digit string representation using the global
/// generator.
///
/// Use this to quickly get a new push-style ID as a string.
///
/// # Examples
///
/// ```rust
/// let x = pushid::new_string(); // e.g., "-NjEtLV-543210"
///
/// assert!(regex::Regex::new(r"^[-0-9A-Z_a-z]{14}$").unwrap().is_match(&x));
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]
pub fn new_string() -> String {
    new().into()
}

#[cfg(test)]
mod tests {
    /// Generates no IDs sharing same timestamp and entropy under multithreading
    #[test]
    fn generates_no_ids_sharing_same_timestamp_and_entropy_under_multithreading() {
        use std::{collections::HashSet, sync::mpsc, thread};

        let (tx, rx) = mpsc::channel();
        for _ in 0..4 {
            let tx = tx.clone();
            thread::spawn(move || {
                for _ in 0..10000 {
                    tx.send(super::new()).unwrap();
                }
            });
        }
        drop(tx);

        let mut s = HashSet::new();
        while let Ok(e) = rx.recv() {
            s.insert((e.timestamp(), e.entropy()));
        }

        assert_eq!(s.len(), 4 * 10000);
    }
}
