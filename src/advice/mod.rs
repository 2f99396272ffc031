pub(crate) mod manager;
pub(crate) mod model;
pub(crate) mod status;
