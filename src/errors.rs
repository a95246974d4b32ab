use thiserror::Error;

/// A result type for Bayesian optimization errors
pub type Result<T> = std::result::Result<T, BoError>;

/// An error raised during a Bayesian optimization run
#[derive(Error, Debug)]
pub enum BoError {
    /// When configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfigError(String),
    /// When the surrogate model fails
    #[error("Surrogate error: {0}")]
    SurrogateError(String),
    /// When a local solver run fails; recovered per restart trial
    #[error("Local solver failure: {0}")]
    LocalSolverFailure(String),
    /// When every acquisition optimization restart of one iteration failed
    #[error("Acquisition proposal failure: all {0} restarts failed")]
    NoCandidateError(usize),
    /// When the run is cancelled by the user
    #[error("Run cancelled")]
    CancellationError,
    /// When an argmin framework error is raised
    #[error(transparent)]
    ArgminError(#[from] argmin::core::Error),
}
