pub use self::{connectivity::*, gravity::*, grid::*, pair::*};

pub(crate) mod connectivity;
pub(crate) mod gravity;
pub(crate) mod grid;
pub(crate) mod pair;
