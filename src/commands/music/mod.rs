pub mod play;
pub mod queue;
pub mod skip;

pub mod utils;

use crate::{CommandResult, Context};
use crate::registry::Command;
