pub(crate) mod publisher;
