//! Fixtures
//!
//! YAML definitions of the event line-up and the coupon table. The `luxe`
//! set ships embedded in the library; other sets are read from disk.

use std::{fs, path::PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    catalog::{Catalog, Event, EventId},
    coupons::{CouponBook, CouponError},
    discounts::Discount,
};

/// Name of the built-in fixture set.
pub const BUILTIN_SET: &str = "luxe";

const BUILTIN_EVENTS: &str = include_str!("../../fixtures/events/luxe.yml");
const BUILTIN_COUPONS: &str = include_str!("../../fixtures/coupons/luxe.yml");

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Two events share an id
    #[error("Duplicate event id: {0}")]
    DuplicateEvent(EventId),

    /// Invalid coupon definition
    #[error(transparent)]
    Coupon(#[from] CouponError),
}

#[derive(Debug, Deserialize)]
struct EventsFixture {
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct CouponsFixture {
    coupons: FxHashMap<String, Discount>,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    events: Vec<Event>,

    coupons: CouponBook,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            events: Vec::new(),
            coupons: CouponBook::empty(),
        }
    }

    /// The embedded `luxe` set.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded YAML is invalid.
    pub fn builtin() -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .add_events(BUILTIN_EVENTS)?
            .add_coupons(BUILTIN_COUPONS)?;

        Ok(fixture)
    }

    /// Load events from `<base>/events/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or repeats an event id.
    pub fn load_events(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("events").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.add_events(&contents)
    }

    /// Load coupons from `<base>/coupons/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a discount is out of range.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("coupons").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.add_coupons(&contents)
    }

    /// Load events and coupons with the same name
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_events(name)?.load_coupons(name)
    }

    fn add_events(&mut self, yaml: &str) -> Result<&mut Self, FixtureError> {
        let fixture: EventsFixture = serde_norway::from_str(yaml)?;

        let mut seen: FxHashSet<EventId> = self.events.iter().map(|event| event.id).collect();

        for event in &fixture.events {
            if !seen.insert(event.id) {
                return Err(FixtureError::DuplicateEvent(event.id));
            }
        }

        self.events.extend(fixture.events);

        Ok(self)
    }

    fn add_coupons(&mut self, yaml: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CouponsFixture = serde_norway::from_str(yaml)?;

        for (code, discount) in fixture.coupons {
            self.coupons.insert(&code, discount)?;
        }

        Ok(self)
    }

    /// Loaded events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Catalog of the loaded events
    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.events.clone())
    }

    /// Loaded coupons
    pub fn coupon_book(&self) -> CouponBook {
        self.coupons.clone()
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn builtin_set_parses() -> TestResult {
        let fixture = Fixture::builtin()?;

        assert_eq!(fixture.events().len(), 6);
        assert_eq!(fixture.coupon_book(), CouponBook::default());

        Ok(())
    }

    #[test]
    fn builtin_prices_are_exact() -> TestResult {
        let catalog = Fixture::builtin()?.catalog();
        let neon = catalog.event(1)?;

        let prices: Vec<(&str, Decimal, bool)> = neon
            .ticket_types
            .iter()
            .map(|t| (t.name.as_str(), t.price, t.available))
            .collect();

        assert_eq!(
            prices,
            vec![
                ("Early Bird", Decimal::from(80), true),
                ("Standard", Decimal::from(100), true),
                ("VIP", Decimal::from(150), true),
                ("LUXE Experience", Decimal::from(250), false),
            ]
        );

        Ok(())
    }

    #[test]
    fn loads_sets_from_disk() -> TestResult {
        let dir = tempfile::tempdir()?;

        fs::create_dir_all(dir.path().join("events"))?;
        fs::create_dir_all(dir.path().join("coupons"))?;
        fs::write(dir.path().join("events/test.yml"), BUILTIN_EVENTS)?;
        fs::write(
            dir.path().join("coupons/test.yml"),
            "coupons:\n  HALF:\n    kind: percentage\n    value: 50\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_set("test")?;

        assert_eq!(fixture.events().len(), 6);
        assert_eq!(
            fixture.coupon_book().get("half"),
            Some(Discount::Percentage(Decimal::from(50)))
        );

        Ok(())
    }

    #[test]
    fn duplicate_event_ids_are_rejected() {
        let mut fixture = Fixture::new();

        let result = fixture
            .add_events(BUILTIN_EVENTS)
            .and_then(|fixture| fixture.add_events(BUILTIN_EVENTS))
            .map(|_| ());

        assert!(
            matches!(result, Err(FixtureError::DuplicateEvent(1))),
            "expected DuplicateEvent, got {result:?}"
        );
    }

    #[test]
    fn out_of_range_coupons_are_rejected() {
        let mut fixture = Fixture::new();

        let result = fixture
            .add_coupons("coupons:\n  GREEDY:\n    kind: percentage\n    value: 150\n")
            .map(|_| ());

        assert!(
            matches!(result, Err(FixtureError::Coupon(_))),
            "expected Coupon error, got {result:?}"
        );
    }

    #[test]
    fn missing_files_surface_io_errors() {
        let mut fixture = Fixture::with_base_path("/nonexistent/fixtures");

        let result = fixture.load_events("luxe").map(|_| ());

        assert!(
            matches!(result, Err(FixtureError::Io(_))),
            "expected Io error, got {result:?}"
        );
    }
}
