//! Time-ordered identifier minting for the in-memory store.

use std::sync::{Arc, Mutex};

use mockable::Clock;
use uuid::Builder;

use crate::domain::DocumentId;

/// Mints UUIDv7-layout identifiers that sort in minting order.
///
/// The millisecond timestamp never moves backwards, even if the clock does,
/// and the trailing bytes carry a per-minter sequence so identifiers minted
/// within one millisecond still ascend.
pub(super) struct IdMinter {
    clock: Arc<dyn Clock>,
    state: Mutex<MintState>,
}

#[derive(Default)]
struct MintState {
    last_millis: u64,
    sequence: u64,
}

/// Upper bound keeping the sequence clear of the variant bits.
const SEQUENCE_MASK: u64 = (1 << 62) - 1;

impl IdMinter {
    pub(super) fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(MintState::default()),
        }
    }

    /// Next identifier, or `None` when the state lock is poisoned.
    pub(super) fn mint(&self) -> Option<DocumentId> {
        let now = u64::try_from(self.clock.utc().timestamp_millis()).unwrap_or_default();
        let mut state = self.state.lock().ok()?;
        state.last_millis = state.last_millis.max(now);
        state.sequence = (state.sequence + 1) & SEQUENCE_MASK;

        let mut tail = [0_u8; 10];
        tail[2..].copy_from_slice(&state.sequence.to_be_bytes());
        let uuid = Builder::from_unix_timestamp_millis(state.last_millis, &tail).into_uuid();
        Some(DocumentId::from_uuid(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MutableClock;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn clock_at(millis: i64) -> Arc<MutableClock> {
        let start = Utc
            .timestamp_millis_opt(millis)
            .single()
            .expect("valid timestamp");
        Arc::new(MutableClock::new(start))
    }

    #[rstest]
    fn ids_minted_in_the_same_millisecond_ascend() {
        let minter = IdMinter::new(clock_at(1_720_000_000_000));
        let ids: Vec<_> = (0..50).map(|_| minter.mint().expect("mint")).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[rstest]
    fn ids_ascend_when_the_clock_moves_backwards() {
        let clock = clock_at(1_720_000_000_000);
        let minter = IdMinter::new(clock.clone());
        let first = minter.mint().expect("mint");
        clock.advance_seconds(-60);
        let second = minter.mint().expect("mint");
        assert!(first < second);
    }

    #[rstest]
    fn ids_use_the_v7_layout() {
        let minter = IdMinter::new(clock_at(1_720_000_000_000));
        let id = minter.mint().expect("mint");
        assert_eq!(id.as_uuid().get_version_num(), 7);
    }
}
