//! Local solver backends used internally to optimize the acquisition criterion

mod optimizer;

pub(crate) use optimizer::*;
