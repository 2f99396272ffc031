pub(crate) mod coordinator;
pub(crate) mod state;
