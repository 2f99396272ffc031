pub(crate) mod artifact;
pub(crate) mod http;
pub(crate) mod local;
pub(crate) mod remote;
