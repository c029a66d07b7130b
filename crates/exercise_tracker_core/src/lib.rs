pub mod dates;
pub mod domain;
pub mod ports;
pub mod tracker;
pub mod validation;

pub use domain::{Exercise, ExerciseLog, ExerciseQuery, ExerciseSummary, Log, NewExercise, User};
pub use ports::{DatabaseService, PortError, PortResult};
pub use tracker::{CacheRefresh, ExerciseInput, LogFilter, TrackerError};
pub use validation::ValidationError;
