//! Collaborators feeding the synchronizer: upstream provider, snapshot cache and locale store.

pub mod cache;
pub mod provider;
pub mod store;
