//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    ArticleService, CommentService, MIN_PASSWORD_COST, PasswordHasher, UserService,
};
use crate::outbound::memory::InMemoryDocumentStore;

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock by `seconds` (negative values rewind it).
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed instant used as the starting point of test clocks.
pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).single() {
        Some(timestamp) => timestamp,
        None => panic!("fixture timestamp"),
    }
}

/// Services wired over one fresh in-memory store.
pub struct BlogFixture {
    pub clock: Arc<MutableClock>,
    pub users: UserService,
    pub articles: ArticleService,
    pub comments: CommentService,
}

impl BlogFixture {
    /// Fresh store with the default page-size ceiling.
    pub fn new() -> Self {
        Self::with_max_page_size(crate::domain::DEFAULT_MAX_PAGE_SIZE)
    }

    /// Fresh store with a custom page-size ceiling. Passwords are hashed at
    /// the cheapest bcrypt cost.
    pub fn with_max_page_size(max_page_size: usize) -> Self {
        let clock = Arc::new(MutableClock::new(fixture_timestamp()));
        let store = Arc::new(InMemoryDocumentStore::new(clock.clone()));
        let services = crate::domain::BlogServices::new(
            store,
            clock.clone(),
            PasswordHasher::new(MIN_PASSWORD_COST),
            max_page_size,
        );
        Self {
            clock,
            users: services.users,
            articles: services.articles,
            comments: services.comments,
        }
    }
}

impl Default for BlogFixture {
    fn default() -> Self {
        Self::new()
    }
}
