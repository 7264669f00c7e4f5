#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

mod listener;
pub use self::listener::ActivityListener;

mod barrier;
pub use self::barrier::CountingBarrier;

mod latch;
pub use self::latch::{DrainGate, DrainLatch, DrainOutcome};
