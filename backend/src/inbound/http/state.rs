//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{BootcampsCommand, BootcampsQuery, CoursesCommand, CoursesQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Bootcamp reads.
    pub bootcamps: Arc<dyn BootcampsQuery>,
    /// Bootcamp writes.
    pub bootcamps_command: Arc<dyn BootcampsCommand>,
    /// Course reads.
    pub courses: Arc<dyn CoursesQuery>,
    /// Course writes.
    pub courses_command: Arc<dyn CoursesCommand>,
}

impl HttpState {
    /// Bundle the four driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use devcamper::domain::ports::FixtureGeocoder;
    /// use devcamper::domain::{BootcampService, CourseService};
    /// use devcamper::inbound::http::state::HttpState;
    /// use devcamper::outbound::persistence::InMemoryDocumentStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryDocumentStore::new());
    /// let clock: Arc<dyn mockable::Clock> = Arc::new(DefaultClock);
    /// let bootcamps = Arc::new(BootcampService::new(
    ///     store.clone(),
    ///     Arc::new(FixtureGeocoder::default()),
    ///     clock.clone(),
    /// ));
    /// let courses = Arc::new(CourseService::new(store, clock));
    /// let state = HttpState::new(bootcamps.clone(), bootcamps, courses.clone(), courses);
    /// # let _ = state;
    /// ```
    pub fn new(
        bootcamps: Arc<dyn BootcampsQuery>,
        bootcamps_command: Arc<dyn BootcampsCommand>,
        courses: Arc<dyn CoursesQuery>,
        courses_command: Arc<dyn CoursesCommand>,
    ) -> Self {
        Self {
            bootcamps,
            bootcamps_command,
            courses,
            courses_command,
        }
    }
}
