mod acquisition;
mod bo_config;
mod bo_solver;
mod bo_state;
mod hyperfit;

pub use bo_config::*;
pub use bo_solver::*;
pub use bo_state::*;
